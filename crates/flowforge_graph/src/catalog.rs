// SPDX-License-Identifier: MIT OR Apache-2.0
//! Built-in workflow node catalog.
//!
//! Triggers start a workflow, actions do work, flow nodes branch and merge.

use crate::node::{NodeCategory, NodeRegistry, NodeTypeDescriptor, ParameterKind, ParameterSpec};
use serde_json::json;

fn slots(names: &[&str]) -> Vec<String> {
    names.iter().map(|n| (*n).to_string()).collect()
}

fn descriptor(
    node_type: &str,
    name: &str,
    category: NodeCategory,
    icon: &str,
    description: &str,
    inputs: &[&str],
    outputs: &[&str],
    parameters: Vec<ParameterSpec>,
) -> NodeTypeDescriptor {
    NodeTypeDescriptor {
        node_type: node_type.to_string(),
        name: name.to_string(),
        category,
        icon: icon.to_string(),
        description: description.to_string(),
        inputs: slots(inputs),
        outputs: slots(outputs),
        parameters,
    }
}

/// Create the workflow node registry
pub fn create_workflow_registry() -> NodeRegistry {
    let mut registry = NodeRegistry::new();

    // Triggers
    registry.register(descriptor(
        "manual_trigger",
        "Manual Trigger",
        NodeCategory::Trigger,
        "play",
        "Runs the workflow when started by hand",
        &[],
        &["main"],
        vec![],
    ));

    registry.register(descriptor(
        "webhook",
        "Webhook",
        NodeCategory::Trigger,
        "link",
        "Runs the workflow when a request arrives",
        &[],
        &["main"],
        vec![
            ParameterSpec::new("path", "Path", ParameterKind::String, json!("")),
            ParameterSpec::new("method", "HTTP Method", ParameterKind::Options, json!("POST"))
                .with_options(&["GET", "POST", "PUT", "DELETE"]),
        ],
    ));

    registry.register(descriptor(
        "schedule",
        "Schedule",
        NodeCategory::Trigger,
        "clock",
        "Runs the workflow on a cron schedule",
        &[],
        &["main"],
        vec![ParameterSpec::new("cron", "Cron Expression", ParameterKind::String, json!("0 * * * *"))],
    ));

    // Actions
    registry.register(descriptor(
        "http_request",
        "HTTP Request",
        NodeCategory::Action,
        "globe",
        "Calls an HTTP endpoint",
        &["main"],
        &["main"],
        vec![
            ParameterSpec::new("url", "URL", ParameterKind::String, json!("")),
            ParameterSpec::new("method", "Method", ParameterKind::Options, json!("GET"))
                .with_options(&["GET", "POST", "PUT", "PATCH", "DELETE"]),
            ParameterSpec::new("headers", "Headers", ParameterKind::Json, json!({})),
        ],
    ));

    registry.register(descriptor(
        "code",
        "Code",
        NodeCategory::Action,
        "code",
        "Runs a script against the incoming items",
        &["main"],
        &["main"],
        vec![ParameterSpec::new("source", "Source", ParameterKind::String, json!("return items;"))],
    ));

    registry.register(descriptor(
        "send_email",
        "Send Email",
        NodeCategory::Action,
        "mail",
        "Sends an email",
        &["main"],
        &["main"],
        vec![
            ParameterSpec::new("to", "To", ParameterKind::String, json!("")),
            ParameterSpec::new("subject", "Subject", ParameterKind::String, json!("")),
            ParameterSpec::new("body", "Body", ParameterKind::String, json!("")),
        ],
    ));

    registry.register(descriptor(
        "slack",
        "Slack",
        NodeCategory::Action,
        "message",
        "Posts a message to a Slack channel",
        &["main"],
        &["main"],
        vec![
            ParameterSpec::new("channel", "Channel", ParameterKind::String, json!("#general")),
            ParameterSpec::new("text", "Text", ParameterKind::String, json!("")),
        ],
    ));

    // Data
    registry.register(descriptor(
        "set",
        "Set",
        NodeCategory::Data,
        "edit",
        "Sets fields on each item",
        &["main"],
        &["main"],
        vec![
            ParameterSpec::new("values", "Values", ParameterKind::Json, json!({})),
            ParameterSpec::new("keep_only_set", "Keep Only Set", ParameterKind::Boolean, json!(false)),
        ],
    ));

    // Flow control
    registry.register(descriptor(
        "if",
        "If",
        NodeCategory::Flow,
        "split",
        "Routes items by a condition",
        &["main"],
        &["true", "false"],
        vec![ParameterSpec::new("condition", "Condition", ParameterKind::String, json!(""))],
    ));

    registry.register(descriptor(
        "merge",
        "Merge",
        NodeCategory::Flow,
        "merge",
        "Combines two inputs",
        &["main", "main"],
        &["main"],
        vec![ParameterSpec::new("mode", "Mode", ParameterKind::Options, json!("append"))
            .with_options(&["append", "combine", "wait"])],
    ));

    registry.register(descriptor(
        "wait",
        "Wait",
        NodeCategory::Flow,
        "pause",
        "Pauses before continuing",
        &["main"],
        &["main"],
        vec![ParameterSpec::new("seconds", "Seconds", ParameterKind::Number, json!(1))],
    ));

    registry
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handle::{self, HandleKind};

    #[test]
    fn test_catalog_contents() {
        let registry = create_workflow_registry();
        assert_eq!(registry.types_in_category(NodeCategory::Trigger).count(), 3);
        assert!(registry.get("http_request").is_some());

        // Triggers have no inputs
        for trigger in registry.types_in_category(NodeCategory::Trigger) {
            assert!(trigger.inputs.is_empty(), "{} has inputs", trigger.node_type);
        }
    }

    #[test]
    fn test_merge_inputs_are_indexed() {
        let registry = create_workflow_registry();
        let merge = registry.get("merge").unwrap();
        assert_eq!(handle::resolve(merge, HandleKind::Input, "main_1"), Some(1));
        assert_eq!(handle::resolve(merge, HandleKind::Input, "main"), Some(0));
    }
}
