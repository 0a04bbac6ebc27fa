mod cli;
mod commands;
mod render;

pub async fn run(args: Vec<String>) -> anyhow::Result<()> {
    let cmd = cli::parse_args(&args)?;
    match cmd {
        cli::Command::Help(topic) => {
            cli::print_help(topic);
            Ok(())
        }
        cli::Command::Migrate(conn) => commands::migrate(conn).await,
        cli::Command::Companies(conn, filter) => commands::companies(conn, filter).await,
        cli::Command::Company(conn, handle) => commands::company(conn, handle).await,
        cli::Command::PatchCompany(conn, handle, body) => {
            commands::patch_company(conn, handle, body).await
        }
        cli::Command::Jobs(conn, filter) => commands::jobs(conn, filter).await,
        cli::Command::Job(conn, id) => commands::job(conn, id).await,
        cli::Command::PatchJob(conn, id, body) => commands::patch_job(conn, id, body).await,
    }
}
