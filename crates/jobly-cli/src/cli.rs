use jobly::{CompanyFilter, JobFilter};
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HelpTopic {
    Root,
    Migrate,
    Companies,
    Jobs,
    Patch,
}

/// Where to find the database.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnArgs {
    pub config: PathBuf,
    pub database: Option<String>,
}

impl Default for ConnArgs {
    fn default() -> Self {
        Self {
            config: PathBuf::from("jobly.toml"),
            database: None,
        }
    }
}

#[derive(Debug, Clone)]
pub enum Command {
    Help(HelpTopic),
    Migrate(ConnArgs),
    Companies(ConnArgs, CompanyFilter),
    Company(ConnArgs, String),
    PatchCompany(ConnArgs, String, String),
    Jobs(ConnArgs, JobFilter),
    Job(ConnArgs, i32),
    PatchJob(ConnArgs, i32, String),
}

pub fn parse_args(args: &[String]) -> anyhow::Result<Command> {
    let mut it = args.iter().skip(1).map(|s| s.as_str());
    let Some(first) = it.next() else {
        return Ok(Command::Help(HelpTopic::Root));
    };

    match first {
        "-h" | "--help" | "help" => Ok(Command::Help(HelpTopic::Root)),
        "migrate" => parse_migrate(it),
        "companies" => parse_companies(it),
        "company" => parse_company(it),
        "patch-company" => parse_patch_company(it),
        "jobs" => parse_jobs(it),
        "job" => parse_job(it),
        "patch-job" => parse_patch_job(it),
        _ => anyhow::bail!("unknown command: {first}"),
    }
}

/// Consume `--config` / `--database` (and their `=` forms) into `conn`.
///
/// Returns `Ok(false)` if `token` is not a connection option.
fn take_conn_arg<'a>(
    token: &str,
    it: &mut impl Iterator<Item = &'a str>,
    conn: &mut ConnArgs,
) -> anyhow::Result<bool> {
    match token {
        "--config" => {
            let Some(v) = it.next() else {
                anyhow::bail!("--config requires a value");
            };
            conn.config = PathBuf::from(v);
        }
        _ if token.starts_with("--config=") => {
            conn.config = PathBuf::from(token.trim_start_matches("--config="));
        }
        "--database" => {
            let Some(v) = it.next() else {
                anyhow::bail!("--database requires a value");
            };
            conn.database = Some(v.to_string());
        }
        _ if token.starts_with("--database=") => {
            conn.database = Some(token.trim_start_matches("--database=").to_string());
        }
        _ => return Ok(false),
    }
    Ok(true)
}

fn value_of<'a>(flag: &str, it: &mut impl Iterator<Item = &'a str>) -> anyhow::Result<&'a str> {
    match it.next() {
        Some(v) => Ok(v),
        None => anyhow::bail!("{flag} requires a value"),
    }
}

fn parse_int(flag: &str, v: &str) -> anyhow::Result<i32> {
    v.parse::<i32>()
        .map_err(|_| anyhow::anyhow!("{flag} expects an integer, got {v:?}"))
}

fn parse_migrate<'a>(mut it: impl Iterator<Item = &'a str>) -> anyhow::Result<Command> {
    let mut conn = ConnArgs::default();

    while let Some(token) = it.next() {
        if take_conn_arg(token, &mut it, &mut conn)? {
            continue;
        }
        match token {
            "-h" | "--help" => return Ok(Command::Help(HelpTopic::Migrate)),
            other => anyhow::bail!("unknown argument: {other}"),
        }
    }

    Ok(Command::Migrate(conn))
}

fn parse_companies<'a>(mut it: impl Iterator<Item = &'a str>) -> anyhow::Result<Command> {
    let mut conn = ConnArgs::default();
    let mut filter = CompanyFilter::default();

    while let Some(token) = it.next() {
        if take_conn_arg(token, &mut it, &mut conn)? {
            continue;
        }
        match token {
            "-h" | "--help" => return Ok(Command::Help(HelpTopic::Companies)),
            "--name-like" => filter.name_like = Some(value_of(token, &mut it)?.to_string()),
            "--min-employees" => {
                filter.min_employees = Some(parse_int(token, value_of(token, &mut it)?)?);
            }
            "--max-employees" => {
                filter.max_employees = Some(parse_int(token, value_of(token, &mut it)?)?);
            }
            other => anyhow::bail!("unknown argument: {other}"),
        }
    }

    Ok(Command::Companies(conn, filter))
}

fn parse_jobs<'a>(mut it: impl Iterator<Item = &'a str>) -> anyhow::Result<Command> {
    let mut conn = ConnArgs::default();
    let mut filter = JobFilter::default();

    while let Some(token) = it.next() {
        if take_conn_arg(token, &mut it, &mut conn)? {
            continue;
        }
        match token {
            "-h" | "--help" => return Ok(Command::Help(HelpTopic::Jobs)),
            "--title" => filter.title = Some(value_of(token, &mut it)?.to_string()),
            "--min-salary" => {
                filter.min_salary = Some(parse_int(token, value_of(token, &mut it)?)?);
            }
            "--has-equity" => filter.has_equity = Some(true),
            other => anyhow::bail!("unknown argument: {other}"),
        }
    }

    Ok(Command::Jobs(conn, filter))
}

/// Collect connection options and up to `max` positional arguments.
fn parse_positionals<'a>(
    mut it: impl Iterator<Item = &'a str>,
    max: usize,
    help: HelpTopic,
) -> anyhow::Result<Result<(ConnArgs, Vec<String>), Command>> {
    let mut conn = ConnArgs::default();
    let mut positionals = Vec::new();

    while let Some(token) = it.next() {
        if take_conn_arg(token, &mut it, &mut conn)? {
            continue;
        }
        match token {
            "-h" | "--help" => return Ok(Err(Command::Help(help))),
            // A JSON body starts with `{`, never with `-`.
            other if other.starts_with('-') => anyhow::bail!("unknown argument: {other}"),
            other if positionals.len() < max => positionals.push(other.to_string()),
            other => anyhow::bail!("unexpected argument: {other}"),
        }
    }

    Ok(Ok((conn, positionals)))
}

fn parse_company<'a>(it: impl Iterator<Item = &'a str>) -> anyhow::Result<Command> {
    let (conn, mut pos) = match parse_positionals(it, 1, HelpTopic::Companies)? {
        Ok(v) => v,
        Err(help) => return Ok(help),
    };
    let Some(handle) = pos.pop() else {
        anyhow::bail!("missing argument: <handle>");
    };
    Ok(Command::Company(conn, handle))
}

fn parse_job<'a>(it: impl Iterator<Item = &'a str>) -> anyhow::Result<Command> {
    let (conn, pos) = match parse_positionals(it, 1, HelpTopic::Jobs)? {
        Ok(v) => v,
        Err(help) => return Ok(help),
    };
    let Some(id) = pos.first() else {
        anyhow::bail!("missing argument: <id>");
    };
    Ok(Command::Job(conn, parse_int("<id>", id)?))
}

fn parse_patch_company<'a>(it: impl Iterator<Item = &'a str>) -> anyhow::Result<Command> {
    let (conn, mut pos) = match parse_positionals(it, 2, HelpTopic::Patch)? {
        Ok(v) => v,
        Err(help) => return Ok(help),
    };
    if pos.len() != 2 {
        anyhow::bail!("usage: jobly patch-company <handle> <json>");
    }
    let body = pos.remove(1);
    let handle = pos.remove(0);
    Ok(Command::PatchCompany(conn, handle, body))
}

fn parse_patch_job<'a>(it: impl Iterator<Item = &'a str>) -> anyhow::Result<Command> {
    let (conn, mut pos) = match parse_positionals(it, 2, HelpTopic::Patch)? {
        Ok(v) => v,
        Err(help) => return Ok(help),
    };
    if pos.len() != 2 {
        anyhow::bail!("usage: jobly patch-job <id> <json>");
    }
    let body = pos.remove(1);
    let id = parse_int("<id>", &pos[0])?;
    Ok(Command::PatchJob(conn, id, body))
}

pub fn print_help(topic: HelpTopic) {
    match topic {
        HelpTopic::Root => {
            println!(
                "\
jobly - admin CLI for the jobly companies/jobs database

USAGE:
  jobly <COMMAND> [OPTIONS]

COMMANDS:
  migrate                        Apply embedded schema migrations
  companies                      List companies
  company <handle>               Show a company and its jobs
  patch-company <handle> <json>  Partially update a company
  jobs                           List jobs
  job <id>                       Show a job
  patch-job <id> <json>          Partially update a job
  help                           Print this help

GLOBAL OPTIONS:
  --config <FILE>       Config file path (default: jobly.toml)
  --database <URL>      Override database.url from config
  -h, --help            Print help

Without a config file, DATABASE_URL (and .env) is used.
Run `jobly <command> --help` for more."
            );
        }
        HelpTopic::Migrate => {
            println!(
                "\
USAGE:
  jobly migrate [--config <FILE>] [--database <URL>]

Applies every pending migration bundled with this binary."
            );
        }
        HelpTopic::Companies => {
            println!(
                "\
USAGE:
  jobly companies [OPTIONS]
  jobly company <handle>

FILTERS:
  --name-like <TEXT>    Case-insensitive substring of the name
  --min-employees <N>   At least N employees
  --max-employees <N>   At most N employees"
            );
        }
        HelpTopic::Jobs => {
            println!(
                "\
USAGE:
  jobly jobs [OPTIONS]
  jobly job <id>

FILTERS:
  --title <TEXT>        Case-insensitive substring of the title
  --min-salary <N>      Salary of at least N
  --has-equity          Only jobs with non-zero equity"
            );
        }
        HelpTopic::Patch => {
            println!(
                "\
USAGE:
  jobly patch-company <handle> <json>
  jobly patch-job <id> <json>

The JSON object lists only the fields to change, e.g.
  jobly patch-company acme '{{\"numEmployees\": 250, \"logoUrl\": null}}'

Company fields: name, description, numEmployees, logoUrl
Job fields:     title, salary, equity"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(v: &[&str]) -> Vec<String> {
        std::iter::once("jobly")
            .chain(v.iter().copied())
            .map(str::to_string)
            .collect()
    }

    #[test]
    fn no_args_prints_root_help() {
        let cmd = parse_args(&args(&[])).unwrap();
        assert!(matches!(cmd, Command::Help(HelpTopic::Root)));
    }

    #[test]
    fn parse_companies_filters() {
        let cmd = parse_args(&args(&[
            "companies",
            "--name-like",
            "net",
            "--min-employees=10",
            "--database",
            "postgres://x/db",
        ]));
        // `--min-employees=10` is not an accepted form.
        assert!(cmd.is_err());

        let cmd = parse_args(&args(&[
            "companies",
            "--name-like",
            "net",
            "--min-employees",
            "10",
            "--database=postgres://x/db",
        ]))
        .unwrap();
        let Command::Companies(conn, filter) = cmd else {
            panic!("expected companies");
        };
        assert_eq!(conn.database.as_deref(), Some("postgres://x/db"));
        assert_eq!(conn.config, PathBuf::from("jobly.toml"));
        assert_eq!(filter.name_like.as_deref(), Some("net"));
        assert_eq!(filter.min_employees, Some(10));
        assert_eq!(filter.max_employees, None);
    }

    #[test]
    fn parse_jobs_has_equity() {
        let cmd = parse_args(&args(&["jobs", "--has-equity", "--config", "other.toml"])).unwrap();
        let Command::Jobs(conn, filter) = cmd else {
            panic!("expected jobs");
        };
        assert_eq!(filter.has_equity, Some(true));
        assert_eq!(conn.config, PathBuf::from("other.toml"));
    }

    #[test]
    fn parse_patch_company_keeps_body() {
        let cmd = parse_args(&args(&["patch-company", "acme", r#"{"name": "Acme"}"#])).unwrap();
        let Command::PatchCompany(_, handle, body) = cmd else {
            panic!("expected patch-company");
        };
        assert_eq!(handle, "acme");
        assert_eq!(body, r#"{"name": "Acme"}"#);
    }

    #[test]
    fn parse_patch_job_requires_numeric_id() {
        let cmd = parse_args(&args(&["patch-job", "7", r#"{"salary": 1}"#])).unwrap();
        assert!(matches!(cmd, Command::PatchJob(_, 7, _)));

        assert!(parse_args(&args(&["patch-job", "seven", "{}"])).is_err());
        assert!(parse_args(&args(&["patch-job", "7"])).is_err());
    }

    #[test]
    fn rejects_unknown_input() {
        assert!(parse_args(&args(&["frobnicate"])).is_err());
        assert!(parse_args(&args(&["company"])).is_err());
        assert!(parse_args(&args(&["company", "a", "b"])).is_err());
        assert!(parse_args(&args(&["jobs", "--salary", "1"])).is_err());
    }

    #[test]
    fn subcommand_help() {
        let cmd = parse_args(&args(&["patch-job", "--help"])).unwrap();
        assert!(matches!(cmd, Command::Help(HelpTopic::Patch)));
    }
}
