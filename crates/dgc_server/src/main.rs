use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    match dgc_server::start_server().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("dgc_server: {err}");
            ExitCode::FAILURE
        }
    }
}
