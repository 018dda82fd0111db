//! The setup workflow: project, inventory, hosts, job template, optional
//! launch.

use serde_json::{Value, json};
use tracing::{info, warn};

use crate::client::{AwxClient, Resource};
use crate::error::AwxResult;

/// A host to ensure under the inventory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostSpec {
    pub name: String,
    pub ansible_host: String,
}

impl HostSpec {
    /// Parse a `name=address` CLI argument.
    pub fn parse(raw: &str) -> Result<Self, String> {
        match raw.split_once('=') {
            Some((name, address)) if !name.is_empty() && !address.is_empty() => Ok(Self {
                name: name.to_string(),
                ansible_host: address.to_string(),
            }),
            _ => Err(format!("expected NAME=ADDRESS, got {raw:?}")),
        }
    }
}

/// Everything the setup run needs besides credentials.
#[derive(Debug, Clone)]
pub struct SetupPlan {
    pub project_name: String,
    pub git_url: String,
    pub playbook: String,
    pub inventory_name: String,
    pub hosts: Vec<HostSpec>,
    pub job_template_name: String,
}

pub fn project_payload(plan: &SetupPlan) -> Value {
    json!({
        "name": plan.project_name,
        "description": format!("{} repository", plan.project_name),
        "scm_type": "git",
        "scm_url": plan.git_url,
        "scm_branch": "",
        "scm_clean": true,
        "scm_delete_on_update": false,
        "scm_update_on_launch": true,
        "scm_update_cache_timeout": 0,
    })
}

pub fn inventory_payload(plan: &SetupPlan) -> Value {
    json!({
        "name": plan.inventory_name,
        "description": format!("{} inventory", plan.inventory_name),
        "organization": 1,
    })
}

pub fn host_payload(host: &HostSpec) -> Value {
    // AWX stores host variables as a JSON string, not an object.
    let variables = json!({
        "ansible_host": host.ansible_host,
        "ansible_connection": "ssh",
    });
    json!({
        "name": host.name,
        "description": "",
        "variables": variables.to_string(),
    })
}

pub fn job_template_payload(plan: &SetupPlan, project: &Resource, inventory: &Resource) -> Value {
    json!({
        "name": plan.job_template_name,
        "description": format!("Job template for {}", plan.playbook),
        "project": project.id,
        "playbook": plan.playbook,
        "inventory": inventory.id,
        "ask_inventory_on_launch": false,
        "ask_credential_on_launch": false,
        "ask_variables_on_launch": true,
        "verbosity": 0,
        "limit": "",
        "forks": 0,
        "use_fact_cache": false,
    })
}

/// Run the whole setup. Safe to repeat: existing resources are reused and
/// the job template is PATCHed to the wanted settings.
pub async fn run(client: &AwxClient, plan: &SetupPlan, launch: bool) -> AwxResult<()> {
    info!(host = %client.host(), "connecting to awx");

    let project = client
        .get_or_create("projects", &plan.project_name, &project_payload(plan))
        .await?;

    let inventory = match client
        .get_or_create("inventories", &plan.inventory_name, &inventory_payload(plan))
        .await
    {
        Ok(inventory) => inventory,
        Err(e) => {
            warn!(error = %e, "could not create the inventory, falling back");
            client.fallback_inventory().await?
        }
    };

    for host in &plan.hosts {
        let endpoint = format!("inventories/{}/hosts", inventory.id);
        let payload = host_payload(host);
        match client.find_by_name(&endpoint, &host.name).await? {
            Some(existing) => {
                client
                    .patch(
                        &format!("hosts/{}", existing.id),
                        &json!({ "variables": payload["variables"] }),
                    )
                    .await?;
                info!(host = host.name, id = existing.id, "host variables updated");
            }
            None => {
                let created = client.post(&endpoint, &payload).await?;
                info!(host = host.name, id = created.id, "host created");
            }
        }
    }

    let template = client
        .converge(
            "job_templates",
            &plan.job_template_name,
            &job_template_payload(plan, &project, &inventory),
        )
        .await?;

    if launch {
        let job = client.launch(&template).await?;
        info!(job, "follow the job in the awx ui");
    }

    info!(
        project = project.name,
        inventory = inventory.name,
        template = template.name,
        "setup complete"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plan() -> SetupPlan {
        SetupPlan {
            project_name: "infra".into(),
            git_url: "https://git.example/infra.git".into(),
            playbook: "ansible/site.yaml".into(),
            inventory_name: "infra".into(),
            hosts: vec![HostSpec {
                name: "fw-nva".into(),
                ansible_host: "10.0.0.10".into(),
            }],
            job_template_name: "gather-vm-info".into(),
        }
    }

    #[test]
    fn host_spec_parses_name_equals_address() {
        let host = HostSpec::parse("fw-nva=10.0.0.10").unwrap();
        assert_eq!(host.name, "fw-nva");
        assert_eq!(host.ansible_host, "10.0.0.10");
        assert!(HostSpec::parse("no-separator").is_err());
        assert!(HostSpec::parse("=10.0.0.10").is_err());
        assert!(HostSpec::parse("name=").is_err());
    }

    #[test]
    fn project_payload_requests_update_on_launch() {
        let payload = project_payload(&plan());
        assert_eq!(payload["scm_type"], "git");
        assert_eq!(payload["scm_url"], "https://git.example/infra.git");
        assert_eq!(payload["scm_update_on_launch"], true);
    }

    #[test]
    fn host_variables_are_embedded_as_a_json_string() {
        let payload = host_payload(&plan().hosts[0]);
        let variables = payload["variables"].as_str().unwrap();
        let parsed: Value = serde_json::from_str(variables).unwrap();
        assert_eq!(parsed["ansible_host"], "10.0.0.10");
        assert_eq!(parsed["ansible_connection"], "ssh");
    }

    #[test]
    fn job_template_payload_links_project_and_inventory() {
        let project = Resource { id: 11, name: "infra".into() };
        let inventory = Resource { id: 22, name: "infra".into() };
        let payload = job_template_payload(&plan(), &project, &inventory);
        assert_eq!(payload["project"], 11);
        assert_eq!(payload["inventory"], 22);
        assert_eq!(payload["playbook"], "ansible/site.yaml");
        assert_eq!(payload["ask_variables_on_launch"], true);
    }
}
