use perfrank_types::{RunData, SampleSource};

/// Which run and which action to grade out of a sample file.
#[derive(Debug, Clone, Default)]
pub struct SampleSelector {
    pub run_id: Option<String>,
    /// Keep only response times recorded for this action label.
    pub action: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedSample {
    pub values: Vec<f64>,
    pub run_id: Option<String>,
}

/// Flattens any accepted sample file shape into a single response-time vector.
///
/// A data set with exactly one run needs no `run_id`; with more it must be named.
pub fn resolve_sample(
    source: SampleSource,
    selector: &SampleSelector,
) -> anyhow::Result<ResolvedSample> {
    let (run, run_id) = match source {
        SampleSource::Values(values) => {
            if selector.action.is_some() {
                anyhow::bail!("a bare value array carries no action labels to filter on");
            }
            return Ok(ResolvedSample {
                values,
                run_id: selector.run_id.clone(),
            });
        }
        SampleSource::Run(run) => (run, selector.run_id.clone()),
        SampleSource::DataSet(mut runs) => {
            let id = match &selector.run_id {
                Some(id) => id.clone(),
                None if runs.len() == 1 => runs.keys().next().cloned().unwrap_or_default(),
                None => anyhow::bail!(
                    "sample file holds {} runs; pick one with a run id ({})",
                    runs.len(),
                    runs.keys().cloned().collect::<Vec<_>>().join(", ")
                ),
            };
            let run = runs
                .remove(&id)
                .ok_or_else(|| anyhow::anyhow!("run {id:?} not found in sample file"))?;
            (run, Some(id))
        }
    };

    let values = match &selector.action {
        Some(action) => filter_action(run, action)?,
        None => run.response_times,
    };
    Ok(ResolvedSample { values, run_id })
}

fn filter_action(run: RunData, action: &str) -> anyhow::Result<Vec<f64>> {
    if run.actions.len() != run.response_times.len() {
        anyhow::bail!(
            "run has {} action labels for {} response times",
            run.actions.len(),
            run.response_times.len()
        );
    }
    let values: Vec<f64> = run
        .response_times
        .into_iter()
        .zip(run.actions)
        .filter(|(_, a)| a == action)
        .map(|(v, _)| v)
        .collect();
    if values.is_empty() {
        anyhow::bail!("no response times recorded for action {action:?}");
    }
    Ok(values)
}
