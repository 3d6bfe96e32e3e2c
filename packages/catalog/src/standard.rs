//! Standard tier: single-table aggregations over `traffic_stops`.

use enforceiq_stop_models::DURATION_BUCKETS;

use crate::policy::{AgeBuckets, CatalogPolicy, DurationMinutes};

/// Number of standard queries. Enforced by a test.
#[cfg(test)]
pub const EXPECTED_STANDARD_COUNT: usize = 14;

/// Builds the standard tier's `(label, sql)` pairs in display order.
pub fn entries(policy: &CatalogPolicy) -> Vec<(&'static str, String)> {
    vec![
        (
            "1. 🚘 Vehicle_Number involved in drug-related stops",
            "select vehicle_number, drugs_related_stop from traffic_stops \
             where drugs_related_stop = true limit 10"
                .to_string(),
        ),
        (
            "2. Most frequently searched vechicles",
            "select vehicle_number, count(*) as search_count from traffic_stops \
             where search_conducted = true group by vehicle_number \
             order by search_count desc limit 1"
                .to_string(),
        ),
        (
            "3. Which driver age group had the highest arrest rate?",
            age_group_arrest_rate(&policy.age_buckets),
        ),
        (
            "4. Gender distribution of drivers stopped in each country",
            "select country_name, driver_gender, count(*) as stop_counts from traffic_stops \
             where search_conducted = true\n\
             group by country_name, driver_gender order by country_name, stop_counts desc"
                .to_string(),
        ),
        (
            "5. Which race and gender combination has the highest search rate ?",
            "select driver_gender, driver_race, count(*) as stop_counts from traffic_stops \
             where search_conducted = true group by driver_gender, driver_race\n\
             order by stop_counts desc limit 1"
                .to_string(),
        ),
        (
            "6. What time of day sees the most traffic stops?",
            "select\n  \
               case\n    \
                 when extract(hour from stop_time) between 5 and 11 then 'Morning'\n    \
                 when extract(hour from stop_time) between 12 and 16 then 'Noon'\n    \
                 when extract(hour from stop_time) between 17 and 20 then 'Evening'\n    \
                 else 'Night'\n  \
               end as time_of_day,\n  \
               count(*) as stop_counts\n\
             from traffic_stops where stop_time is not null\n\
             group by time_of_day order by stop_counts desc limit 1"
                .to_string(),
        ),
        (
            "7. Average stop duration for different violations?",
            average_duration_by_violation(&policy.duration_minutes),
        ),
        (
            "8. Are stops during the night more likely to lead to arrests?",
            "select case when stop_time between '22:00:00' and '23:59:59' \
             or stop_time between '00:00:00' and '05:00:00' then 'Night' else 'Day'\n\
             end as time_of_day, \
             (cast(sum(case when stop_outcome = 'Arrest' then 1 else 0 end) as numeric) \
             / count(*)) * 100 as arrest_percentage\n\
             from traffic_stops group by time_of_day order by time_of_day"
                .to_string(),
        ),
        (
            "9. Which violations are most associated with searches or arrests?",
            "select violation, count(*) as stop_counts,\n\
             (cast(sum(case when search_conducted = true or stop_outcome = 'Arrest' \
             then 1 else 0 end) as numeric) / count(*)) * 100 as search_or_arrest_percent\n\
             from traffic_stops group by violation order by search_or_arrest_percent desc"
                .to_string(),
        ),
        (
            "10. Violations that are most common among younger drivers <25",
            "select violation, count(*) as common_violation_count from traffic_stops \
             where driver_age < 25 group by violation order by common_violation_count"
                .to_string(),
        ),
        (
            "11. A violation that rarely results in search or arrest",
            "select violation, count(*) as stop_counts,\n\
             (cast(sum(case when search_conducted = true or stop_outcome = 'Arrest' \
             then 1 else 0 end) as numeric) / count(*)) * 100 as search_or_arrest_percent\n\
             from traffic_stops group by violation order by search_or_arrest_percent asc limit 1"
                .to_string(),
        ),
        (
            "12. Which countries report the highest rate of drug-related stops?",
            "select country_name, count(*) as stop_counts from traffic_stops \
             where drugs_related_stop = true\n\
             group by country_name order by stop_counts desc"
                .to_string(),
        ),
        (
            "13. The arrest rate by country and violation",
            "select country_name, violation, \
             cast(sum(case when stop_outcome = 'Arrest' then 1 else 0 end) as numeric) \
             / count(*) * 100 as arrest_percentage\n\
             from traffic_stops group by violation, country_name order by arrest_percentage desc"
                .to_string(),
        ),
        (
            "14. Which country has the most stops with search conducted?",
            "select country_name, count(*) as stop_counts from traffic_stops \
             where search_conducted = true\n\
             group by country_name order by stop_counts desc limit 1"
                .to_string(),
        ),
    ]
}

fn age_group_arrest_rate(ages: &AgeBuckets) -> String {
    let mut sql = String::from("select\n  case\n");
    sql.push_str(&format!(
        "    when driver_age < {} then '{}'\n",
        ages.minor_below,
        ages.minor_label()
    ));
    for (max, label) in ages.closed_groups() {
        sql.push_str(&format!("    when driver_age <= {max} then '{label}'\n"));
    }
    sql.push_str(&format!("    else '{}'\n", ages.oldest_label()));
    sql.push_str(
        "  end as Age_group,\n  \
         driver_age, avg(case when is_arrested = true then 1 else 0 end) as rate_of_arrest\n\
         from traffic_stops\n\
         group by driver_age\n\
         order by rate_of_arrest desc limit 1",
    );
    sql
}

fn average_duration_by_violation(minutes: &DurationMinutes) -> String {
    let mut sql = String::from("select violation, avg(case stop_duration\n");
    for (bucket, value) in DURATION_BUCKETS.iter().zip(minutes.in_bucket_order()) {
        sql.push_str(&format!("    when '{bucket}' then {value}\n"));
    }
    sql.push_str(
        "  end) as avg_stop_duration_min from traffic_stops \
         where stop_duration is not null group by violation \
         order by avg_stop_duration_min desc",
    );
    sql
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_age_buckets_render_literals() {
        let sql = age_group_arrest_rate(&AgeBuckets::default());
        assert!(sql.contains("when driver_age < 18 then 'under18'"));
        assert!(sql.contains("when driver_age <= 25 then '18-25'"));
        assert!(sql.contains("when driver_age <= 35 then '26-35'"));
        assert!(sql.contains("when driver_age <= 50 then '36-50'"));
        assert!(sql.contains("when driver_age <= 65 then '51-65'"));
        assert!(sql.contains("else '65+'"));
    }

    #[test]
    fn default_minutes_render_literals() {
        let sql = average_duration_by_violation(&DurationMinutes::default());
        assert!(sql.contains("when '0-15 Min' then 7.5"));
        assert!(sql.contains("when '16-30 Min' then 23\n"));
        assert!(sql.contains("when '30+ Min' then 35\n"));
    }

    #[test]
    fn custom_age_buckets_move_boundaries() {
        let ages = AgeBuckets {
            minor_below: 21,
            young_adult_max: 29,
            adult_max: 39,
            middle_age_max: 59,
            senior_max: 69,
        };
        let sql = age_group_arrest_rate(&ages);
        assert!(sql.contains("when driver_age < 21 then 'under21'"));
        assert!(sql.contains("when driver_age <= 29 then '21-29'"));
        assert!(sql.contains("else '69+'"));
    }
}
