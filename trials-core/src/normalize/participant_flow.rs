use serde_json::Value;
use tracing::{debug, warn};

use crate::entities::ParticipantFlow;

const UNKNOWN_REASON: &str = "Unknown";

/// Build the participant funnel from a study's `resultsSection`
///
/// Returns `None` when the section carries no (or an empty) participant flow
/// module. Subject counts that are not integers count as zero.
pub fn participant_flow(results_section: &Value) -> Option<ParticipantFlow> {
    let module = results_section
        .get("participantFlowModule")
        .and_then(Value::as_object)
        .filter(|module| !module.is_empty());

    let Some(module) = module else {
        debug!("No participant flow module in results section");
        return None;
    };

    let mut flow = ParticipantFlow::default();
    for period in items(module.get("periods")) {
        for milestone in items(period.get("milestones")) {
            let kind = milestone
                .get("type")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_uppercase();

            for achievement in items(milestone.get("achievements")) {
                let count = num_subjects(achievement.get("flowAchievementNumSubjects"));
                match kind.as_str() {
                    "STARTED" => flow.record_started(count),
                    "COMPLETED" => flow.record_completed(count),
                    _ => {}
                }
            }
        }

        for drop_withdraw in items(period.get("dropWithdraws")) {
            let reason = drop_withdraw
                .get("type")
                .and_then(Value::as_str)
                .unwrap_or(UNKNOWN_REASON);
            let count = items(drop_withdraw.get("reasons"))
                .iter()
                .map(|r| num_subjects(r.get("numSubjects")))
                .sum::<u64>();
            flow.record_dropped(reason, count);
        }
    }

    debug!(
        started = flow.total_started,
        completed = flow.total_completed,
        dropped = flow.total_dropped,
        "Parsed participant flow"
    );
    Some(flow)
}

fn items(value: Option<&Value>) -> &[Value] {
    value
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or(&[])
}

/// Registry subject counts are published as strings; numbers are accepted too
fn num_subjects(value: Option<&Value>) -> u64 {
    let parsed = match value {
        None | Some(Value::Null) => return 0,
        Some(Value::String(text)) => text.trim().parse::<u64>().ok(),
        Some(Value::Number(number)) => number.as_u64(),
        Some(_) => None,
    };

    parsed.unwrap_or_else(|| {
        warn!(value = ?value, "Invalid number of subjects");
        0
    })
}
