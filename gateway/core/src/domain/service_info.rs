// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! GA4GH service-info document.
//!
//! Static for the lifetime of the process: built once from configuration and
//! served verbatim by `GET /service-info`. No backend call is involved.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::domain::config::ServiceInfoSettings;

pub const WES_VERSION: &str = "1.0.0";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ServiceType {
    pub group: &'static str,
    pub artifact: &'static str,
    pub version: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Organization {
    pub name: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WorkflowTypeVersion {
    pub workflow_type_version: Vec<&'static str>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ServiceInfo {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub service_type: ServiceType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub organization: Organization,
    #[serde(rename = "contactUrl", skip_serializing_if = "Option::is_none")]
    pub contact_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub environment: Option<String>,
    pub version: &'static str,

    pub workflow_type_versions: BTreeMap<&'static str, WorkflowTypeVersion>,
    pub supported_wes_versions: Vec<&'static str>,
    pub supported_filesystem_protocols: Vec<&'static str>,
    pub workflow_engine_versions: BTreeMap<&'static str, &'static str>,
    pub default_workflow_engine_parameters: Vec<serde_json::Value>,
    pub system_state_counts: BTreeMap<&'static str, u64>,
    pub auth_instructions_url: String,
    pub tags: BTreeMap<String, String>,
}

impl ServiceInfo {
    pub fn from_settings(settings: &ServiceInfoSettings) -> Self {
        // Workflow languages HealthOmics private workflows accept
        let workflow_type_versions = [
            ("WDL", vec!["1.0", "1.1", "development"]),
            ("NEXTFLOW", vec!["22.04", "23.10", "24.10"]),
            ("CWL", vec!["v1.2"]),
        ]
        .into_iter()
        .map(|(kind, versions)| {
            (
                kind,
                WorkflowTypeVersion {
                    workflow_type_version: versions,
                },
            )
        })
        .collect();

        Self {
            id: settings.id.clone(),
            name: settings.name.clone(),
            service_type: ServiceType {
                group: "org.ga4gh",
                artifact: "wes",
                version: WES_VERSION,
            },
            description: settings.description.clone(),
            organization: Organization {
                name: settings.organization_name.clone(),
                url: settings.organization_url.clone(),
            },
            contact_url: settings.contact_url.clone(),
            environment: settings.environment.clone(),
            version: env!("CARGO_PKG_VERSION"),
            workflow_type_versions,
            supported_wes_versions: vec![WES_VERSION],
            supported_filesystem_protocols: vec!["s3", "omics"],
            workflow_engine_versions: BTreeMap::from([("aws-healthomics", "1")]),
            default_workflow_engine_parameters: Vec::new(),
            system_state_counts: BTreeMap::new(),
            auth_instructions_url: "https://docs.aws.amazon.com/omics/latest/dev/security-iam.html"
                .to_string(),
            tags: BTreeMap::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn carries_ga4gh_type_and_settings() {
        let settings = ServiceInfoSettings {
            description: Some("dev stack".into()),
            ..ServiceInfoSettings::default()
        };
        let value = serde_json::to_value(ServiceInfo::from_settings(&settings)).unwrap();

        assert_eq!(
            value["type"],
            json!({"group": "org.ga4gh", "artifact": "wes", "version": "1.0.0"})
        );
        assert_eq!(value["description"], json!("dev stack"));
        assert_eq!(value["supported_wes_versions"], json!(["1.0.0"]));
        assert!(value["workflow_type_versions"]["WDL"]["workflow_type_version"].is_array());
        assert!(value.get("contactUrl").is_none());
    }
}
