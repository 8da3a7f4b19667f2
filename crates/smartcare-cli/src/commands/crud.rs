use std::fs;
use std::io::{self, Read};

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde_json::Value;
use smartcare_client::{Entity, EntityId, ResourceHook, SmartCareClient};

use crate::cli::{OutputFormat, ResourceName};
use crate::commands::{Reported, explain};
use crate::output::print_value;

/// Run `$body` with `$hook` bound to the typed hook for `$resource`.
macro_rules! with_hook {
    ($client:expr, $resource:expr, $hook:ident => $body:expr) => {
        match $resource {
            ResourceName::Patients => {
                let $hook = $client.patients();
                $body
            }
            ResourceName::Guardians => {
                let $hook = $client.guardians();
                $body
            }
            ResourceName::Accidents => {
                let $hook = $client.accidents();
                $body
            }
            ResourceName::Cameras => {
                let $hook = $client.cameras();
                $body
            }
            ResourceName::Messages => {
                let $hook = $client.messages();
                $body
            }
            ResourceName::Rooms => {
                let $hook = $client.rooms();
                $body
            }
            ResourceName::EnvLogs => {
                let $hook = $client.env_logs();
                $body
            }
        }
    };
}

fn read_body(file: &Option<String>) -> Result<Value> {
    let content = match file {
        Some(path) => {
            fs::read_to_string(path).with_context(|| format!("Failed to read file: {path}"))?
        }
        None => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read from stdin")?;
            buf
        }
    };
    serde_json::from_str(&content).context("Invalid JSON")
}

fn parse_as<T: DeserializeOwned>(body: Value, resource: ResourceName) -> Result<T> {
    serde_json::from_value(body)
        .with_context(|| format!("Body does not match the {resource:?} schema"))
}

pub async fn list(
    client: &SmartCareClient,
    resource: ResourceName,
    format: OutputFormat,
) -> Result<()> {
    with_hook!(client, resource, hook => list_in(&hook, format).await)
}

async fn list_in<T: Entity>(hook: &ResourceHook<T>, format: OutputFormat) -> Result<()> {
    let items = hook.list().await.map_err(explain)?;
    print_value(items.as_slice(), format)
}

pub async fn create(
    client: &SmartCareClient,
    resource: ResourceName,
    file: &Option<String>,
    format: OutputFormat,
) -> Result<()> {
    let body = read_body(file)?;
    with_hook!(client, resource, hook => create_in(&hook, body, resource, format).await)
}

async fn create_in<T>(
    hook: &ResourceHook<T>,
    body: Value,
    resource: ResourceName,
    format: OutputFormat,
) -> Result<()>
where
    T: Entity,
    T::Create: DeserializeOwned,
{
    let input: T::Create = parse_as(body, resource)?;
    let created = hook.create(&input).await.map_err(|_| Reported)?;
    print_value(&created, format)
}

pub async fn update(
    client: &SmartCareClient,
    resource: ResourceName,
    id: EntityId,
    file: &Option<String>,
    format: OutputFormat,
) -> Result<()> {
    let body = read_body(file)?;
    with_hook!(client, resource, hook => update_in(&hook, id, body, resource, format).await)
}

async fn update_in<T>(
    hook: &ResourceHook<T>,
    id: EntityId,
    body: Value,
    resource: ResourceName,
    format: OutputFormat,
) -> Result<()>
where
    T: Entity,
    T::Patch: DeserializeOwned,
{
    let patch: T::Patch = parse_as(body, resource)?;
    let updated = hook.update(id, &patch).await.map_err(|_| Reported)?;
    print_value(&updated, format)
}

pub async fn delete(client: &SmartCareClient, resource: ResourceName, id: EntityId) -> Result<()> {
    with_hook!(client, resource, hook => hook.delete(id).await.map_err(|_| Reported)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use smartcare_client::{InsertPatient, MessagePatch};

    #[test]
    fn test_parse_create_body() {
        let input: InsertPatient = parse_as(
            json!({ "name": "Kim", "age": 80, "roomId": 3 }),
            ResourceName::Patients,
        )
        .unwrap();
        assert_eq!(input.name, "Kim");
        assert_eq!(input.room_id, Some(3));
    }

    #[test]
    fn test_parse_rejects_wrong_shape() {
        let err = parse_as::<InsertPatient>(json!({ "age": "old" }), ResourceName::Patients)
            .unwrap_err();
        assert!(err.to_string().contains("Patients"));
    }

    #[test]
    fn test_parse_partial_patch() {
        let patch: MessagePatch =
            parse_as(json!({ "read": true }), ResourceName::Messages).unwrap();
        assert_eq!(patch.read, Some(true));
        assert!(patch.message.is_none());
    }
}
