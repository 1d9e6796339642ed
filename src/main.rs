use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use paper_grader::utils::logging;
use paper_grader::{App, Config};

#[derive(Parser, Debug)]
#[command(name = "paper-grader", version, about = "试卷出题与答题卡评分客户端")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// 老师端：抽取题目、上传配图、提交，任务文件中有答题卡时一并评分
    Instructor {
        /// 任务文件（TOML）
        #[arg(long)]
        job: PathBuf,
    },
    /// 评分一名学生的答题卡（1–5 张）
    Evaluate {
        #[arg(long)]
        usn: String,
        #[arg(long, num_args = 1.., required = true)]
        images: Vec<PathBuf>,
        /// 缺省时取上次提交题目时的科目
        #[arg(long)]
        subject: Option<String>,
        /// 缺省时取上次提交题目时的考试类型
        #[arg(long)]
        exam_type: Option<String>,
    },
    /// 学生端：查看某科目的反馈
    Student {
        #[arg(long)]
        usn: String,
        #[arg(long)]
        subject: String,
        /// 缺省时取该科目的第一个考试类型
        #[arg(long)]
        exam_type: Option<String>,
    },
    /// 学生端：列出已登记的科目
    Subjects {
        #[arg(long)]
        usn: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // 加载配置
    let config = Config::from_env();

    // 初始化日志
    logging::init(config.verbose_logging);

    let mode = match &cli.command {
        Command::Instructor { .. } => "老师端任务",
        Command::Evaluate { .. } => "答题卡评分",
        Command::Student { .. } => "学生反馈",
        Command::Subjects { .. } => "学生科目",
    };
    logging::log_startup(mode, &config.backend_base_url);

    let app = App::new(config)?;

    match cli.command {
        Command::Instructor { job } => {
            app.run_job(&job).await?;
        }
        Command::Evaluate {
            usn,
            images,
            subject,
            exam_type,
        } => {
            app.run_evaluation(&usn, &images, subject, exam_type).await?;
        }
        Command::Student {
            usn,
            subject,
            exam_type,
        } => {
            app.run_student_report(&usn, &subject, exam_type.as_deref())
                .await?;
        }
        Command::Subjects { usn } => {
            app.list_subjects(&usn).await?;
        }
    }

    Ok(())
}
