use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    vaxdesk_lib::init_tracing();

    match vaxdesk_lib::run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{e}");
            ExitCode::FAILURE
        }
    }
}
