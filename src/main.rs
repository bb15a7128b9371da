// ==========================================
// 企业培训管理系统 - 命令行入口
// ==========================================
// 用法:
//   training-mgmt init-db
//   training-mgmt check-conflicts <user_id> <training_id>
//   training-mgmt validate <user_id> <training_id>
// 数据库路径: 环境变量 TRAINING_MGMT_DB_PATH 或用户数据目录
// ==========================================

use anyhow::Context;
use std::process::ExitCode;

use training_mgmt::app::{get_default_db_path, AppState};

const USAGE: &str = "用法:
  training-mgmt init-db
  training-mgmt check-conflicts <user_id> <training_id>
  training-mgmt validate <user_id> <training_id>";

enum Command {
    InitDb,
    CheckConflicts { user_id: String, training_id: String },
    Validate { user_id: String, training_id: String },
}

fn parse_args(args: &[String]) -> Result<Command, String> {
    match args {
        [cmd] if cmd == "init-db" => Ok(Command::InitDb),
        [cmd, user_id, training_id] if cmd == "check-conflicts" => Ok(Command::CheckConflicts {
            user_id: user_id.clone(),
            training_id: training_id.clone(),
        }),
        [cmd, user_id, training_id] if cmd == "validate" => Ok(Command::Validate {
            user_id: user_id.clone(),
            training_id: training_id.clone(),
        }),
        _ => Err(USAGE.to_string()),
    }
}

async fn run(db_path: String, command: Command) -> anyhow::Result<serde_json::Value> {
    tracing::info!("使用数据库: {}", db_path);

    let state = AppState::new(db_path)
        .await
        .map_err(anyhow::Error::msg)
        .context("初始化AppState失败")?;

    let output = match command {
        Command::InitDb => serde_json::json!({
            "db_path": state.db_path,
            "schema_version": training_mgmt::db::CURRENT_SCHEMA_VERSION,
        }),
        Command::CheckConflicts {
            user_id,
            training_id,
        } => {
            let report = state
                .conflict_api
                .check_conflicts(&user_id, &training_id)
                .with_context(|| format!("冲突检测失败: user={}, training={}", user_id, training_id))?;
            serde_json::to_value(&report).context("冲突报告序列化失败")?
        }
        Command::Validate {
            user_id,
            training_id,
        } => {
            let issues = state
                .conflict_api
                .validate_prerequisites(&user_id, &training_id)
                .with_context(|| format!("前置校验失败: user={}, training={}", user_id, training_id))?;
            serde_json::json!({
                "valid": issues.is_empty(),
                "issues": issues,
            })
        }
    };

    Ok(output)
}

#[tokio::main]
async fn main() -> ExitCode {
    training_mgmt::logging::init();

    tracing::info!(
        "{} 版本: {}",
        training_mgmt::APP_NAME,
        training_mgmt::VERSION
    );

    let args: Vec<String> = std::env::args().skip(1).collect();
    let command = match parse_args(&args) {
        Ok(cmd) => cmd,
        Err(usage) => {
            eprintln!("{}", usage);
            return ExitCode::from(2);
        }
    };

    let result = run(get_default_db_path(), command).await.and_then(|output| {
        serde_json::to_string_pretty(&output).context("输出序列化失败")
    });

    match result {
        Ok(text) => {
            println!("{}", text);
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!("执行失败: {:#}", e);
            eprintln!("错误: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    fn args(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_args() {
        assert!(matches!(parse_args(&args(&["init-db"])), Ok(Command::InitDb)));
        assert!(matches!(
            parse_args(&args(&["check-conflicts", "u1", "t1"])),
            Ok(Command::CheckConflicts { ref user_id, ref training_id })
                if user_id == "u1" && training_id == "t1"
        ));
        assert!(matches!(
            parse_args(&args(&["validate", "u1", "t1"])),
            Ok(Command::Validate { .. })
        ));

        assert_eq!(parse_args(&args(&[])).err().as_deref(), Some(USAGE));
        assert!(parse_args(&args(&["check-conflicts", "u1"])).is_err());
        assert!(parse_args(&args(&["init-db", "extra"])).is_err());
    }

    #[tokio::test]
    async fn test_run_reports_context_chain() {
        let temp_file = NamedTempFile::new().expect("Failed to create temp file");
        let db_path = temp_file.path().to_string_lossy().to_string();

        let output = run(db_path.clone(), Command::InitDb)
            .await
            .expect("init-db should succeed");
        assert_eq!(output["db_path"], db_path.as_str());

        let err = run(
            db_path,
            Command::CheckConflicts {
                user_id: String::new(),
                training_id: "t1".to_string(),
            },
        )
        .await
        .expect_err("empty user id should fail");
        let rendered = format!("{:#}", err);
        assert!(rendered.starts_with("冲突检测失败"));
        assert!(err.chain().count() >= 2);
    }
}
