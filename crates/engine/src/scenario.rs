//! Scenario runner – execute scripted launch flows from YAML files.

use crate::commands::CommandRegistry;
use crate::context::AppContext;
use crate::types::*;
use serde_json::Value;

/// Load a scenario from a YAML string.
pub fn load_scenario(yaml: &str) -> Result<Scenario, String> {
    serde_yaml::from_str(yaml).map_err(|e| format!("failed to parse scenario YAML: {}", e))
}

/// Execute a scenario and return the overall result.
pub fn run_scenario(
    scenario: &Scenario,
    ctx: &AppContext,
    registry: &CommandRegistry,
) -> ScenarioResult {
    let mut step_results = Vec::new();
    let mut overall = Status::Pass;

    for (i, step) in scenario.steps.iter().enumerate() {
        let r = registry.execute(&step.call, step.args.clone(), ctx);

        if r.status.as_str() != step.expect_status {
            tracing::warn!(
                step = i,
                expected = %step.expect_status,
                actual = r.status.as_str(),
                "scenario step status mismatch"
            );
            overall = Status::Fail;
        }

        if let Some(expected) = &step.expect {
            let actual = r.data.as_ref().unwrap_or(&Value::Null);
            if !json_contains(actual, expected) {
                tracing::warn!(step = i, %expected, %actual, "scenario step data mismatch");
                overall = Status::Fail;
            }
        }

        if r.timing_ms.total > step.timeout_ms {
            tracing::warn!(
                step = i,
                timeout_ms = step.timeout_ms,
                took_ms = r.timing_ms.total,
                "scenario step exceeded its timeout"
            );
            overall = Status::Fail;
        }

        step_results.push(r);
    }

    ScenarioResult {
        name: scenario.name.clone(),
        overall_status: overall,
        step_results,
    }
}

/// True if every field in `expected` is present in `actual` with an equal
/// value. Objects match by subset, everything else by equality.
fn json_contains(actual: &Value, expected: &Value) -> bool {
    match (actual, expected) {
        (Value::Object(a), Value::Object(e)) => e
            .iter()
            .all(|(k, ev)| a.get(k).is_some_and(|av| json_contains(av, ev))),
        _ => actual == expected,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_scenario() {
        let yaml = r#"
name: basic test
steps:
  - call: "ping"
    args: {}
    expect_status: "pass"
    timeout_ms: 5000
  - call: "normalize_intent"
    args:
      intent:
        action: view
        uri: "myapp://open/profile/42"
    expect:
      intent:
        uri: "https://open/profile/42"
"#;
        let s = load_scenario(yaml).expect("should parse");
        assert_eq!(s.name, Some("basic test".into()));
        assert_eq!(s.steps.len(), 2);
        assert_eq!(s.steps[1].timeout_ms, 30_000);
        assert!(s.steps[1].expect.is_some());
    }

    #[test]
    fn test_run_scenario_deep_links() {
        let yaml = r#"
steps:
  - call: "launch"
    args:
      delivery: create
      intent:
        action: main
    expect:
      outcome: { kind: not_view }
  - call: "launch"
    args:
      delivery: new_intent
      intent:
        action: view
        uri: "http://example.com/a?b=c#d"
    expect:
      intent: { uri: "https://example.com/a?b=c#d" }
  - call: "normalize_intent"
    args:
      strict: true
      intent: { action: view, uri: "myapp://" }
    expect_status: "error"
"#;
        let scenario = load_scenario(yaml).unwrap();
        let ctx = AppContext::default_headless();
        let reg = CommandRegistry::new();
        let result = run_scenario(&scenario, &ctx, &reg);
        assert_eq!(result.overall_status, Status::Pass);
        assert_eq!(result.step_results.len(), 3);
    }

    #[test]
    fn test_run_scenario_expect_mismatch_fails() {
        let yaml = r#"
steps:
  - call: "normalize_intent"
    args:
      intent: { action: view, uri: "myapp://open" }
    expect:
      intent: { uri: "myapp://open" }
"#;
        let scenario = load_scenario(yaml).unwrap();
        let ctx = AppContext::default_headless();
        let reg = CommandRegistry::new();
        let result = run_scenario(&scenario, &ctx, &reg);
        assert_eq!(result.overall_status, Status::Fail);
    }

    #[test]
    fn test_bundled_scenario_passes() {
        let yaml = include_str!("../../../scenarios/deep_links.yaml");
        let scenario = load_scenario(yaml).unwrap();
        let ctx = AppContext::default_headless();
        let reg = CommandRegistry::new();
        let result = run_scenario(&scenario, &ctx, &reg);
        assert_eq!(result.overall_status, Status::Pass);
        assert_eq!(result.step_results.len(), scenario.steps.len());
    }

    #[test]
    fn test_json_contains() {
        let actual = serde_json::json!({ "a": 1, "b": { "c": 2, "d": 3 } });
        assert!(json_contains(&actual, &serde_json::json!({ "b": { "c": 2 } })));
        assert!(!json_contains(&actual, &serde_json::json!({ "b": { "c": 3 } })));
        assert!(!json_contains(&actual, &serde_json::json!({ "x": null })));
    }
}
