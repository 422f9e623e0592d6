use anyhow::{Context, Result};
use question_bot::config::Config;
use question_bot::error::ConfigError;
use question_bot::utils::logging;
use question_bot::workflow::check_event_kind;
use question_bot::{CollectionStore, GitClient, GitHubClient, IssueEvent, SubmissionHandler};
use tracing::{debug, error};

#[tokio::main]
async fn main() -> Result<()> {
    if !Config::running_in_ci() {
        logging::init(false);
        debug!("Not in Github action mode, quiting.");
        return Ok(());
    }

    // 加载配置
    let config = match Config::load() {
        Ok(config) => config,
        Err(e) => {
            logging::init(false);
            error!("{}", e);
            if matches!(&e, ConfigError::EnvVarNotFound { var_name } if var_name == "GITHUB_TOKEN") {
                error!("Token was not provided, please define the Github action 'with' 'github-token' as '${{{{ secrets.GITHUB_TOKEN }}}}'");
            }
            std::process::exit(1);
        }
    };

    // 初始化日志
    logging::init(config.verbose_logging);
    logging::log_startup(&config.repository, &config.event_name);

    if let Some(reason) = check_event_kind(&config.event_name) {
        debug!("{}", reason);
        return Ok(());
    }

    let event = IssueEvent::from_path(&config.event_path)
        .await
        .context("Failed getting issue information")?;

    let handler = SubmissionHandler::new(
        GitHubClient::new(&config)?,
        GitClient::new(&config),
        CollectionStore::new(&config.collections_dir),
        &config.approved_label,
    );

    if let Err(e) = handler.handle(&config.event_name, &event).await {
        error!("{}", e);
        std::process::exit(1);
    }

    Ok(())
}
