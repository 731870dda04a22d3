//! The reconciler: decide, then execute.

use fwsync_api::{is_success, Container, DeviceClient, Diff, ObjectIdentity, TaskReport, NOT_FOUND};
use serde_json::Value;
use tracing::debug;

use crate::error::{Action, ReconcileError};
use crate::schema::ObjectSchema;
use crate::state::{
    comparison_form, managed_projection, validate_desired, DesiredState, Presence,
};

/// The operation that converges observed state to desired state.
#[derive(Debug, Clone, PartialEq)]
pub enum ReconcileDecision {
    /// Already converged; nothing to do.
    NoOp,

    /// Create the object from the payload.
    Create(Value),

    /// Replace the existing object with the payload.
    Modify(Value),

    /// Delete the existing object.
    Delete,
}

impl ReconcileDecision {
    pub fn is_noop(&self) -> bool {
        matches!(self, ReconcileDecision::NoOp)
    }

    fn describe(&self) -> &'static str {
        match self {
            ReconcileDecision::NoOp => "no-op",
            ReconcileDecision::Create(_) => "create",
            ReconcileDecision::Modify(_) => "modify",
            ReconcileDecision::Delete => "delete",
        }
    }
}

/// A decision plus the diff it would produce.
///
/// The diff's `after` side always equals the payload of a non-no-op
/// decision; for delete it is empty, and for a no-op it matches `before`.
#[derive(Debug, Clone, PartialEq)]
pub struct Plan {
    pub decision: ReconcileDecision,
    pub diff: Diff,
}

/// Reconciles one object kind against a device.
///
/// Holds an explicit client handle; there is no process-wide session. The
/// decision phase ([`plan`](Self::plan)) never writes, so it is safe to
/// retry and is all that runs in check mode.
pub struct Reconciler<'a, C> {
    client: &'a C,
    schema: &'a ObjectSchema,
}

impl<'a, C: DeviceClient> Reconciler<'a, C> {
    pub fn new(client: &'a C, schema: &'a ObjectSchema) -> Self {
        Self { client, schema }
    }

    /// Decide how to converge `identity` toward `desired`.
    ///
    /// Pure with respect to device state: fetches the observed object and
    /// computes the decision and diff, performing no writes.
    pub async fn plan(
        &self,
        identity: &ObjectIdentity,
        desired: &DesiredState,
    ) -> Result<Plan, ReconcileError> {
        validate_desired(self.schema, desired)?;

        let observed = self.fetch_observed(identity).await?;
        let plan = self.decide(desired, observed);

        debug!(
            kind = self.schema.kind(),
            object = %identity,
            decision = plan.decision.describe(),
            "planned reconciliation"
        );
        Ok(plan)
    }

    /// Execute a plan's decision against the device.
    pub async fn execute(
        &self,
        identity: &ObjectIdentity,
        plan: &Plan,
    ) -> Result<(), ReconcileError> {
        let endpoint = self.schema.endpoint();

        let (action, status) = match &plan.decision {
            ReconcileDecision::NoOp => return Ok(()),
            ReconcileDecision::Create(payload) => (
                Action::Creating,
                self.client.create(endpoint, identity, payload).await?,
            ),
            ReconcileDecision::Modify(payload) => (
                Action::Editing,
                self.client.edit(endpoint, identity, payload).await?,
            ),
            ReconcileDecision::Delete => (
                Action::Deleting,
                self.client.delete(endpoint, identity).await?,
            ),
        };

        if !is_success(status) {
            return Err(ReconcileError::Operation {
                action,
                name: identity.name().to_string(),
                status,
            });
        }
        Ok(())
    }

    /// Plan and, unless `check_mode` is set, execute; report the result in
    /// the caller contract.
    pub async fn apply(
        &self,
        identity: &ObjectIdentity,
        desired: &DesiredState,
        check_mode: bool,
    ) -> Result<TaskReport, ReconcileError> {
        let plan = self.plan(identity, desired).await?;
        let changed = !plan.decision.is_noop();

        if changed && !check_mode {
            self.execute(identity, &plan).await?;
        }

        let msg = if changed {
            None
        } else {
            Some(match desired.presence() {
                Presence::Present => format!("Object '{}' already exists.", identity.name()),
                Presence::Absent => format!("Object '{}' does not exist.", identity.name()),
            })
        };

        Ok(TaskReport {
            changed,
            msg,
            diff: Some(plan.diff),
            stdout: None,
            stdout_xml: None,
        })
    }

    /// Fetch every object of this kind within `container`.
    pub async fn facts(&self, container: &Container) -> Result<Value, ReconcileError> {
        let (status, body) = self.client.list(self.schema.endpoint(), container).await?;

        if !is_success(status) {
            return Err(ReconcileError::Operation {
                action: Action::Listing,
                name: self.schema.kind().to_string(),
                status,
            });
        }

        body.and_then(|body| body.get("result").cloned())
            .ok_or_else(|| ReconcileError::Malformed("list response without result".to_string()))
    }

    /// Observed entry for `identity`, or `None` when the object does not
    /// exist. Not-found is a valid outcome, not an error.
    async fn fetch_observed(
        &self,
        identity: &ObjectIdentity,
    ) -> Result<Option<Value>, ReconcileError> {
        let (status, body) = self.client.get(self.schema.endpoint(), identity).await?;

        if status == NOT_FOUND {
            return Ok(None);
        }
        if !is_success(status) {
            return Err(ReconcileError::Operation {
                action: Action::Fetching,
                name: identity.name().to_string(),
                status,
            });
        }

        let entry = body
            .as_ref()
            .and_then(|body| body.get("result"))
            .and_then(|result| result.get("entry"));

        Ok(match entry {
            Some(Value::Array(items)) => items.first().cloned(),
            Some(entry @ Value::Object(_)) => Some(entry.clone()),
            _ => None,
        })
    }

    fn decide(&self, desired: &DesiredState, observed: Option<Value>) -> Plan {
        match (desired.presence(), observed) {
            (Presence::Absent, None) => Plan {
                decision: ReconcileDecision::NoOp,
                diff: Diff::empty(),
            },

            (Presence::Absent, Some(observed)) => Plan {
                decision: ReconcileDecision::Delete,
                diff: Diff::new(
                    managed_projection(&observed, self.schema),
                    Diff::empty_side(),
                ),
            },

            (Presence::Present, None) => {
                let payload = desired.entry().clone();
                Plan {
                    decision: ReconcileDecision::Create(payload.clone()),
                    diff: Diff::new(Diff::empty_side(), payload),
                }
            }

            (Presence::Present, Some(observed)) => {
                let desired_cmp = comparison_form(desired.entry(), self.schema);
                let mut observed_cmp = comparison_form(&observed, self.schema);

                if self.schema.ignores_defaulted() {
                    retain_keys(&mut observed_cmp, &desired_cmp);
                }

                let observed_view = managed_projection(&observed, self.schema);
                if desired_cmp == observed_cmp {
                    Plan {
                        decision: ReconcileDecision::NoOp,
                        diff: Diff::new(observed_view.clone(), observed_view),
                    }
                } else {
                    let payload = desired.entry().clone();
                    Plan {
                        decision: ReconcileDecision::Modify(payload.clone()),
                        diff: Diff::new(observed_view, payload),
                    }
                }
            }
        }
    }
}

/// Drop keys from `value` that `reference` does not set.
fn retain_keys(value: &mut Value, reference: &Value) {
    let (Value::Object(map), Value::Object(reference)) = (value, reference) else {
        return;
    };
    map.retain(|key, _| reference.contains_key(key));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::FieldSpec;
    use serde_json::json;

    #[test]
    fn retain_keys_drops_extras() {
        let mut observed = json!({"a": 1, "b": 2});
        retain_keys(&mut observed, &json!({"a": 0}));
        assert_eq!(observed, json!({"a": 1}));
    }

    #[test]
    fn ignore_defaulted_excludes_device_defaults() {
        let schema = ObjectSchema::new(
            "example",
            "/restapi/v10.0/Objects/Examples",
            vec![
                FieldSpec::scalar("description"),
                FieldSpec::wrapped_sequence("members", "member").required(),
            ],
        )
        .ignore_defaulted(true);

        let client = fwsync_api::testing::ScriptedClient::new(vec![]);
        let reconciler = Reconciler::new(&client, &schema);

        // Device reports a defaulted description the caller never set.
        let desired = DesiredState::present(json!({
            "@name": "Example",
            "members": {"member": ["a"]},
        }));
        let observed = json!({
            "@name": "Example",
            "description": "device default",
            "members": {"member": ["a"]},
        });

        let plan = reconciler.decide(&desired, Some(observed));
        assert!(plan.decision.is_noop());
    }
}
