//! Natural-language summary of a prediction.

use std::fmt::Write as _;

use enforceiq_analytics_models::{PredictionQuery, PredictionResult};

/// Renders the prediction and the observation it was made for as a short
/// paragraph.
///
/// Gender code `M` reads as "Male"; every other code reads as "Female".
/// Context fields that were not supplied are left out of the sentence.
#[must_use]
pub fn describe_prediction(query: &PredictionQuery, result: &PredictionResult) -> String {
    let gender = if query.driver_gender == "M" {
        "Male"
    } else {
        "Female"
    };

    let mut text = String::new();
    writeln!(text, "Predicted Violation: {}", result.violation).unwrap();
    writeln!(text, "Predicted Stop Outcome: {}", result.outcome).unwrap();
    text.push('\n');

    write!(text, "A {}-year-old {gender} driver", query.driver_age).unwrap();
    if let Some(country) = non_blank(query.country_name.as_deref()) {
        write!(text, " in {country}").unwrap();
    }
    text.push_str(" was stopped");
    if let Some(time) = query.stop_time {
        write!(text, " at {}", time.format("%I:%M %p")).unwrap();
    }
    if let Some(date) = query.stop_date {
        write!(text, " on {date}").unwrap();
    }
    text.push_str(". ");

    text.push_str(if query.search_conducted {
        "A search was conducted"
    } else {
        "No search was conducted"
    });
    text.push_str(if query.drugs_related_stop {
        " and the stop was drug related.\n"
    } else {
        " and the stop was not drug related.\n"
    });

    writeln!(text, "Stop Duration: {}", query.stop_duration).unwrap();
    if let Some(vehicle) = non_blank(query.vehicle_number.as_deref()) {
        writeln!(text, "Vehicle Number: {vehicle}").unwrap();
    }

    text
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
