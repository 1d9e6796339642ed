use crate::models::job::InstructorJob;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tokio::fs;

/// 从 TOML 文件加载老师端任务
///
/// 任务里的相对路径按任务文件所在目录解析
pub async fn load_instructor_job(job_file_path: &Path) -> Result<InstructorJob> {
    let content = fs::read_to_string(job_file_path)
        .await
        .with_context(|| format!("无法读取任务文件: {}", job_file_path.display()))?;

    let job: InstructorJob = toml::from_str(&content)
        .with_context(|| format!("无法解析任务文件: {}", job_file_path.display()))?;

    let base_dir = job_file_path.parent().unwrap_or_else(|| Path::new("."));
    let job = resolve_paths(job, base_dir);

    tracing::info!(
        "成功加载任务: {} {} ({} 道题, {} 张配图)",
        job.subject,
        job.exam_type,
        job.num_questions,
        job.diagrams.len()
    );

    Ok(job.with_file_path(job_file_path.to_string_lossy().to_string()))
}

fn resolve_paths(mut job: InstructorJob, base_dir: &Path) -> InstructorJob {
    job.paper_image = resolve(base_dir, &job.paper_image);
    for path in job.diagrams.values_mut() {
        *path = resolve(base_dir, path);
    }
    if let Some(answers) = job.answers.as_mut() {
        for path in answers.images.iter_mut() {
            *path = resolve(base_dir, path);
        }
    }
    job
}

fn resolve(base_dir: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base_dir.join(path)
    }
}
