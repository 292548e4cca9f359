use sysinfo::Components;

use crate::core::resolver::runner::MetricTask;
use crate::core::resolver::snapshot::Thermals;
use crate::error::{ResolverError, Result};
use crate::utils::units::decimal;

use super::SharedGpu;

/// CPU die temperature (mean of matching sensors) and GPU temperature
pub struct ThermalsTask {
    components: Components,
    labels: Vec<String>,
    gpu: SharedGpu,
}

impl ThermalsTask {
    pub fn new(labels: Vec<String>, gpu: SharedGpu) -> Self {
        Self {
            components: Components::new_with_refreshed_list(),
            labels: labels.into_iter().map(|l| l.to_lowercase()).collect(),
            gpu,
        }
    }
}

impl MetricTask for ThermalsTask {
    type Output = Thermals;

    fn name(&self) -> &'static str {
        "thermals"
    }

    fn resolve(&mut self) -> Result<Thermals> {
        self.components.refresh(true);

        let readings = self
            .components
            .iter()
            .map(|c| (c.label(), c.temperature()));

        let cpu = die_mean(readings, &self.labels).ok_or_else(|| {
            ResolverError::sensor_unavailable(format!(
                "no CPU die sensor matching {:?}",
                self.labels
            ))
        })?;

        let gpu = match self.gpu.lock().read() {
            Ok(reading) => reading.temperature_celsius.map(|t| decimal(t, 1)),
            Err(e) => {
                log::debug!(target: "resolver::task::thermals", "gpu temperature: {}", e);
                None
            }
        };

        Ok(Thermals {
            cpu: decimal(cpu, 1),
            gpu,
        })
    }
}

/// Mean of the finite readings whose label contains one of `labels`
fn die_mean<'a, I>(readings: I, labels: &[String]) -> Option<f64>
where
    I: Iterator<Item = (&'a str, Option<f32>)>,
{
    let temps: Vec<f64> = readings
        .filter(|(label, _)| {
            let label = label.to_lowercase();
            labels.iter().any(|wanted| label.contains(wanted.as_str()))
        })
        .filter_map(|(_, temp)| temp)
        .filter(|t| t.is_finite())
        .map(f64::from)
        .collect();

    if temps.is_empty() {
        None
    } else {
        Some(temps.iter().sum::<f64>() / temps.len() as f64)
    }
}
