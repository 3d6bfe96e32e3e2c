//! Menu-driven mode, entered when no subcommand is given.

use chrono::NaiveDate;
use dialoguer::{Confirm, Input, Select};
use enforceiq_analytics_models::PredictionQuery;
use enforceiq_catalog_models::QueryTier;

use crate::output;
use crate::session::Session;

/// Top-level actions offered by the menu.
enum Action {
    StandardQuery,
    AdvancedQuery,
    Predict,
    Metrics,
    Server,
}

impl Action {
    const ALL: &[Self] = &[
        Self::StandardQuery,
        Self::AdvancedQuery,
        Self::Predict,
        Self::Metrics,
        Self::Server,
    ];

    #[must_use]
    const fn label(&self) -> &'static str {
        match self {
            Self::StandardQuery => "Run a standard query",
            Self::AdvancedQuery => "Run an advanced query",
            Self::Predict => "Predict a stop outcome",
            Self::Metrics => "Show key metrics",
            Self::Server => "Start server",
        }
    }
}

/// Runs the interactive menu.
///
/// # Errors
///
/// * If a prompt fails
/// * If the catalog policy is invalid
/// * If the server fails to start
pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    println!("EnforceIQ");
    println!();

    let labels: Vec<&str> = Action::ALL.iter().map(Action::label).collect();

    let idx = Select::new()
        .with_prompt("What would you like to do?")
        .items(&labels)
        .default(0)
        .interact()?;

    match Action::ALL[idx] {
        Action::StandardQuery => run_query(QueryTier::Standard).await?,
        Action::AdvancedQuery => run_query(QueryTier::Advanced).await?,
        Action::Predict => predict().await?,
        Action::Metrics => {
            let session = Session::from_env().await?;
            let metrics = session.dataset().await.key_metrics();
            print!("{}", output::render_metrics(&metrics));
        }
        Action::Server => crate::serve(true).await?,
    }

    Ok(())
}

async fn run_query(tier: QueryTier) -> Result<(), Box<dyn std::error::Error>> {
    let session = Session::from_env().await?;
    let labels = session.catalog().labels(tier);

    let idx = Select::new()
        .with_prompt(tier.title())
        .items(&labels)
        .default(0)
        .interact()?;

    let report = session.run_query(tier, labels[idx]).await?;
    println!();
    println!("{}", report.definition.sql());
    println!();
    print!("{}", output::render_report(&report));
    Ok(())
}

async fn predict() -> Result<(), Box<dyn std::error::Error>> {
    let session = Session::from_env().await?;
    let dataset = session.dataset().await;

    let genders = ["M", "F"];
    let gender = Select::new()
        .with_prompt("Driver gender")
        .items(&genders)
        .default(0)
        .interact()?;

    let age: u32 = Input::new()
        .with_prompt("Driver age")
        .default(30)
        .interact_text()?;

    let search_conducted = Confirm::new()
        .with_prompt("Was a search conducted?")
        .default(false)
        .interact()?;

    let drugs_related_stop = Confirm::new()
        .with_prompt("Was the stop drug related?")
        .default(false)
        .interact()?;

    let durations = dataset.duration_options();
    let duration = Select::new()
        .with_prompt("Stop duration")
        .items(&durations)
        .default(0)
        .interact()?;

    let date: String = Input::new()
        .with_prompt("Stop date, YYYY-MM-DD (optional)")
        .allow_empty(true)
        .validate_with(|input: &String| {
            optional(input, |s| s.parse::<NaiveDate>()).map(|_| ())
        })
        .interact_text()?;

    let time: String = Input::new()
        .with_prompt("Stop time, HH:MM (optional)")
        .allow_empty(true)
        .validate_with(|input: &String| optional(input, crate::parse_time).map(|_| ()))
        .interact_text()?;

    let country: String = Input::new()
        .with_prompt("Country (optional)")
        .allow_empty(true)
        .interact_text()?;

    let race: String = Input::new()
        .with_prompt("Driver race (optional)")
        .allow_empty(true)
        .interact_text()?;

    let search_type: String = Input::new()
        .with_prompt("Search type (optional)")
        .allow_empty(true)
        .interact_text()?;

    let vehicle: String = Input::new()
        .with_prompt("Vehicle number (optional)")
        .allow_empty(true)
        .interact_text()?;

    let query = PredictionQuery {
        driver_gender: genders[gender].to_string(),
        driver_age: age,
        search_conducted,
        drugs_related_stop,
        stop_duration: durations[duration].clone(),
        stop_date: optional(&date, |s| s.parse::<NaiveDate>())?,
        stop_time: optional(&time, crate::parse_time)?,
        country_name: non_empty(&country),
        driver_race: non_empty(&race),
        search_type: non_empty(&search_type),
        vehicle_number: non_empty(&vehicle),
    };

    println!();
    crate::predict(&dataset, &query, false)
}

/// Parses a non-blank answer; a blank one is `None`.
fn optional<T, E: std::fmt::Display>(
    value: &str,
    parse: impl Fn(&str) -> Result<T, E>,
) -> Result<Option<T>, String> {
    non_empty(value)
        .map(|s| parse(&s).map_err(|e| format!("'{s}': {e}")))
        .transpose()
}

fn non_empty(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;

    #[test]
    fn menu_labels_are_unique() {
        let labels: BTreeSet<&str> = Action::ALL.iter().map(Action::label).collect();
        assert_eq!(labels.len(), Action::ALL.len());
    }

    #[test]
    fn blank_optional_answers_are_none() {
        assert_eq!(non_empty("  "), None);
        assert_eq!(non_empty(" Canada "), Some("Canada".to_string()));
    }

    #[test]
    fn optional_date_and_time_answers() {
        assert_eq!(optional("", |s| s.parse::<NaiveDate>()), Ok(None));
        assert_eq!(
            optional(" 2005-05-05 ", |s| s.parse::<NaiveDate>()),
            Ok(NaiveDate::from_ymd_opt(2005, 5, 5))
        );
        assert!(optional("05/05/2005", |s| s.parse::<NaiveDate>()).is_err());
        assert_eq!(
            optional("14:30", crate::parse_time),
            Ok(chrono::NaiveTime::from_hms_opt(14, 30, 0))
        );
        assert!(optional("noon", crate::parse_time).is_err());
    }
}
