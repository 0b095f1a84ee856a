use skype_etl::core::cli;
use skype_etl::core::constants::{EXIT_CANCELLED, EXIT_DATABASE_UNAVAILABLE, EXIT_FATAL_ERROR, EXIT_SUCCESS, EXIT_VALIDATION_FAILURE};
use skype_etl::domain::pipeline::run;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli_config = cli::parse();

    let exit_code = match run(cli_config).await {
        Ok(()) => EXIT_SUCCESS,
        Err(e) => {
            eprintln!("\nError: {e:#}\n");
            classify_exit_code(&e)
        }
    };

    std::process::exit(exit_code);
}

fn classify_exit_code(err: &anyhow::Error) -> i32 {
    if let Some(etl_err) = err.downcast_ref::<skype_etl::data::EtlError>() {
        return match etl_err {
            skype_etl::data::EtlError::Validation(_) => EXIT_VALIDATION_FAILURE,
            skype_etl::data::EtlError::Loading(skype_etl::data::LoadError::Unavailable(_)) => {
                EXIT_DATABASE_UNAVAILABLE
            }
            skype_etl::data::EtlError::Cancelled => EXIT_CANCELLED,
            _ => EXIT_FATAL_ERROR,
        };
    }
    EXIT_FATAL_ERROR
}
