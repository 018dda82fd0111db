use clap::{Parser, Subcommand};

use vac_awx::setup::{HostSpec, SetupPlan};
use vac_awx::{AwxClient, setup};
use vac_observe::{LoggerConfig, init_logger};

#[derive(Parser)]
#[command(name = "vac-awx", about = "Provision AWX resources for the vacation stack")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Create or converge the project, inventory, hosts and job template.
    Setup {
        /// Controller base URL, e.g. http://localhost:8080
        #[arg(long)]
        host: String,
        #[arg(long)]
        username: String,
        #[arg(long, env = "AWX_PASSWORD")]
        password: String,
        /// Launch the job template once everything is in place.
        #[arg(long)]
        launch: bool,
        #[arg(long, default_value = "devops-kt")]
        project: String,
        #[arg(long, default_value = "https://github.com/pizour/devops-kt/")]
        git_url: String,
        #[arg(long, default_value = "ansible/gather-vm-info.yaml")]
        playbook: String,
        #[arg(long, default_value = "devops-kt")]
        inventory: String,
        #[arg(long, default_value = "gather-vm-info")]
        job_template: String,
        /// Host to ensure in the inventory, as NAME=ADDRESS. Repeatable.
        #[arg(long = "add-host", value_parser = HostSpec::parse, default_value = "fw-nva=10.0.0.10")]
        hosts: Vec<HostSpec>,
    },
}

#[tokio::main(flavor = "multi_thread")]
async fn main() -> anyhow::Result<()> {
    init_logger(&LoggerConfig::default())?;

    let cli = Cli::parse();
    match cli.command {
        Command::Setup {
            host,
            username,
            password,
            launch,
            project,
            git_url,
            playbook,
            inventory,
            job_template,
            hosts,
        } => {
            let client = AwxClient::new(&host, &username, &password)?;
            let plan = SetupPlan {
                project_name: project,
                git_url,
                playbook,
                inventory_name: inventory,
                hosts,
                job_template_name: job_template,
            };
            setup::run(&client, &plan, launch).await?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(extra: &[&str]) -> Command {
        let mut argv = vec![
            "vac-awx",
            "setup",
            "--host",
            "http://awx.local",
            "--username",
            "admin",
            "--password",
            "pw",
        ];
        argv.extend_from_slice(extra);
        Cli::try_parse_from(argv).unwrap().command
    }

    #[test]
    fn setup_ensures_the_firewall_host_by_default() {
        let Command::Setup { hosts, .. } = parse(&[]);
        assert_eq!(
            hosts,
            vec![HostSpec {
                name: "fw-nva".into(),
                ansible_host: "10.0.0.10".into(),
            }]
        );
    }

    #[test]
    fn explicit_hosts_replace_the_default() {
        let Command::Setup { hosts, .. } = parse(&["--add-host", "web=10.0.0.20"]);
        assert_eq!(
            hosts,
            vec![HostSpec {
                name: "web".into(),
                ansible_host: "10.0.0.20".into(),
            }]
        );
    }
}
