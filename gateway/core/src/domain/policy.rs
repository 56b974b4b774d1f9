// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Execution role policy
//!
//! Builds the IAM policy document the HealthOmics execution role needs:
//! store access, scoped S3 access for the output and source locations, and
//! workflow log delivery. The document is emitted for the deployment
//! pipeline; the facade itself never calls IAM.
//!
//! # Architecture
//!
//! - **Layer:** Domain Layer
//! - **Purpose:** Policy document generation from derived storage scopes

use serde::Serialize;

use crate::domain::scope::{ScopeDeriver, ScopeError, ScopeGrant};

const POLICY_VERSION: &str = "2012-10-17";
const WORKFLOW_LOG_GROUP: &str = "/aws/omics/WorkflowLog";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct PolicyStatement {
    pub effect: &'static str,
    pub action: Vec<&'static str>,
    pub resource: Vec<String>,
}

impl PolicyStatement {
    fn allow(action: Vec<&'static str>, resource: Vec<String>) -> Self {
        Self {
            effect: "Allow",
            action,
            resource,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct PolicyDocument {
    pub version: &'static str,
    pub statement: Vec<PolicyStatement>,
}

/// Account coordinates the policy is rendered for.
#[derive(Debug, Clone)]
pub struct ServiceRolePolicy {
    pub partition: String,
    pub region: String,
    pub account_id: String,
}

impl ServiceRolePolicy {
    pub fn new(
        partition: impl Into<String>,
        region: impl Into<String>,
        account_id: impl Into<String>,
    ) -> Self {
        Self {
            partition: partition.into(),
            region: region.into(),
            account_id: account_id.into(),
        }
    }

    /// Render the policy. The output location gets read/write/list, source
    /// locations get read/list; the source statement is left out entirely
    /// when there are no sources.
    pub fn build(
        &self,
        output_uri: &str,
        source_uris: &[String],
    ) -> Result<PolicyDocument, ScopeError> {
        let deriver = ScopeDeriver::new(self.partition.clone());
        let output = deriver.derive([output_uri])?;
        let sources = deriver.derive(source_uris)?;

        let mut statement = vec![
            PolicyStatement::allow(
                vec!["omics:*"],
                vec![
                    self.arn("omics", "sequenceStore/*"),
                    self.arn("omics", "referenceStore/*"),
                ],
            ),
            PolicyStatement::allow(
                vec!["s3:GetObject", "s3:PutObject", "s3:ListBucket"],
                flatten(&output),
            ),
        ];

        if !sources.is_empty() {
            statement.push(PolicyStatement::allow(
                vec!["s3:GetObject", "s3:ListBucket"],
                flatten(&sources),
            ));
        }

        statement.push(PolicyStatement::allow(
            vec![
                "logs:DescribeLogStreams",
                "logs:CreateLogStream",
                "logs:PutLogEvents",
            ],
            vec![self.arn(
                "logs",
                &format!("log-group:{WORKFLOW_LOG_GROUP}:log-stream:*"),
            )],
        ));
        statement.push(PolicyStatement::allow(
            vec!["logs:CreateLogGroup"],
            vec![self.arn("logs", &format!("log-group:{WORKFLOW_LOG_GROUP}:*"))],
        ));

        Ok(PolicyDocument {
            version: POLICY_VERSION,
            statement,
        })
    }

    fn arn(&self, service: &str, resource: &str) -> String {
        format!(
            "arn:{}:{}:{}:{}:{}",
            self.partition, service, self.region, self.account_id, resource
        )
    }
}

fn flatten(grants: &[ScopeGrant]) -> Vec<String> {
    grants
        .iter()
        .flat_map(|grant| [grant.list_resource.clone(), grant.access_resource.clone()])
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn policy() -> ServiceRolePolicy {
        ServiceRolePolicy::new("aws", "us-east-1", "123456789012")
    }

    #[test]
    fn output_statement_covers_bucket_and_prefix() {
        let doc = policy().build("s3://results/wes", &[]).unwrap();
        let output = &doc.statement[1];
        assert_eq!(output.action, vec!["s3:GetObject", "s3:PutObject", "s3:ListBucket"]);
        assert_eq!(
            output.resource,
            vec!["arn:aws:s3:::results", "arn:aws:s3:::results/wes/*"]
        );
    }

    #[test]
    fn source_statement_only_when_sources_configured() {
        let without = policy().build("s3://results", &[]).unwrap();
        assert_eq!(without.statement.len(), 4);

        let with = policy()
            .build("s3://results", &["s3://reads/run1/".to_string()])
            .unwrap();
        assert_eq!(with.statement.len(), 5);
        assert_eq!(with.statement[2].action, vec!["s3:GetObject", "s3:ListBucket"]);
    }

    #[test]
    fn renders_iam_field_names() {
        let doc = policy().build("s3://results", &[]).unwrap();
        let value = serde_json::to_value(&doc).unwrap();
        assert_eq!(value["Version"], json!("2012-10-17"));
        assert_eq!(
            value["Statement"][0]["Resource"][0],
            json!("arn:aws:omics:us-east-1:123456789012:sequenceStore/*")
        );
        assert_eq!(value["Statement"][0]["Effect"], json!("Allow"));
    }

    fn statement_with<'a>(doc: &'a PolicyDocument, action: &str) -> &'a PolicyStatement {
        doc.statement
            .iter()
            .find(|statement| statement.action.iter().any(|granted| *granted == action))
            .unwrap_or_else(|| panic!("no statement grants {action}"))
    }

    #[test]
    fn log_statements_target_workflow_log_group() {
        let doc = policy().build("s3://results", &[]).unwrap();

        let streams = statement_with(&doc, "logs:PutLogEvents");
        assert_eq!(
            streams.resource,
            vec!["arn:aws:logs:us-east-1:123456789012:log-group:/aws/omics/WorkflowLog:log-stream:*"]
        );
        assert!(streams.action.contains(&"logs:CreateLogStream"));

        let group = statement_with(&doc, "logs:CreateLogGroup");
        assert_eq!(group.action, vec!["logs:CreateLogGroup"]);
        assert_eq!(
            group.resource,
            vec!["arn:aws:logs:us-east-1:123456789012:log-group:/aws/omics/WorkflowLog:*"]
        );
    }

    #[test]
    fn malformed_source_fails_the_whole_policy() {
        let err = policy()
            .build("s3://results", &["results-without-scheme".to_string()])
            .unwrap_err();
        assert!(matches!(err, ScopeError::Configuration { .. }));
    }
}
