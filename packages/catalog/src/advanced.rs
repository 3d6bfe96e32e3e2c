//! Advanced tier: window functions, self-joins, and filtered aggregates.
//!
//! The SQL targets `PostgreSQL` (`filter (where ...)`, `::numeric`,
//! `to_char`). None of these queries take thresholds from the policy.

/// Number of advanced queries. Enforced by a test.
#[cfg(test)]
pub const EXPECTED_ADVANCED_COUNT: usize = 6;

const YEARLY_BREAKDOWN_BY_COUNTRY: &str = r"SELECT
    stop_year,
    country_name,
    total_stops,
    total_arrests,
    (CAST(total_arrests AS NUMERIC) * 100 / total_stops) AS arrest_rate_percent_yearly,
    SUM(total_stops) OVER (PARTITION BY country_name ORDER BY stop_year) AS running_total_stops_per_year,
    SUM(total_arrests) OVER (PARTITION BY country_name ORDER BY stop_year) AS running_total_arrests_per_year
FROM
    (
        SELECT
            EXTRACT(YEAR FROM stop_date) AS stop_year,
            country_name,
            COUNT(*) AS total_stops,
            SUM(CASE WHEN is_arrested = TRUE THEN 1 ELSE 0 END) AS total_arrests
        FROM
            traffic_stops
        WHERE
            stop_date IS NOT NULL
        GROUP BY
            stop_year,
            country_name
    ) AS yearly_country_summary
ORDER BY
    stop_year ASC,
    country_name ASC";

const VIOLATION_TRENDS_BY_AGE_AND_RACE: &str = r"select
    t.driver_age,
    t.driver_race,
    t.violation,
    count(*) as violation_count,
    (cast(count(*) as numeric) * 100 / age_race_totals.total_stops_for_group) as percentage_of_group_stops
from
    traffic_stops as t
join (
    select
        driver_age,
        driver_race,
        count(*) as total_stops_for_group
    from
        traffic_stops
    where
        driver_age is not null
        and driver_race is not null
    group by
        driver_age,
        driver_race
) as age_race_totals
on
    t.driver_age = age_race_totals.driver_age
    and t.driver_race = age_race_totals.driver_race
where
    t.driver_age is not null
    and t.driver_race is not null
    and t.violation is not null
group by
    t.driver_age,
    t.driver_race,
    t.violation,
    age_race_totals.total_stops_for_group
order by
    t.driver_age asc,
    t.driver_race asc,
    percentage_of_group_stops desc";

const STOPS_BY_YEAR_MONTH_HOUR: &str = r"select
    extract(year from stop_date) as stop_year,
    to_char(stop_date, 'Month') as stop_month_name,
    extract(month from stop_date) as stop_month,
    extract(hour from stop_time::time) as stop_hour,
    count(*) as total_stops
from
    traffic_stops
where
    stop_date is not null and stop_time is not null
group by
    stop_year, stop_month_name, stop_month, stop_hour
order by
    stop_year, stop_month, stop_hour";

const SEARCH_AND_ARREST_RANKS: &str = r"select
    violation,
    total_stops,
    stops_with_search,
    percentage_searched,
    stops_with_arrest,
    percentage_arrested,
    dense_rank() over (order by percentage_searched desc) as search_rate_rank,
    dense_rank() over (order by percentage_arrested desc) as arrest_rate_rank
from
    (
        select
            violation,
            count(*) as total_stops,
            count(*) filter (where search_conducted = true) as stops_with_search,
            (count(*) filter (where search_conducted = true)::numeric * 100 / count(*)) as percentage_searched,
            count(*) filter (where is_arrested = true) as stops_with_arrest,
            (count(*) filter (where is_arrested = true)::numeric * 100 / count(*)) as percentage_arrested
        from
            traffic_stops
        where
            violation is not null
        group by
            violation
    ) as violation_stats
where
    total_stops > 0
order by
    percentage_searched desc,
    percentage_arrested desc";

const DEMOGRAPHICS_BY_COUNTRY: &str = "select country_name, driver_age, driver_gender, \
     driver_race, count(*) as stop_counts from traffic_stops\n\
     group by country_name, driver_age, driver_gender, driver_race \
     order by country_name, stop_counts desc";

// Returns every violation, ranked; there is no `limit 5`.
const VIOLATION_ARREST_RATES: &str = "select violation, \
     cast(sum(case when stop_outcome = 'Arrest' then 1 else 0 end) as numeric) \
     / count(*) * 100 as arrest_percentage\n\
     from traffic_stops group by violation order by arrest_percentage desc";

/// The advanced tier's `(label, sql)` pairs in display order.
pub const ENTRIES: &[(&str, &str)] = &[
    (
        "1. Yearly Breakdown of Stops and Arrests by Country",
        YEARLY_BREAKDOWN_BY_COUNTRY,
    ),
    (
        "2. Driver Violation Trends Based on Age and Race",
        VIOLATION_TRENDS_BY_AGE_AND_RACE,
    ),
    (
        "3. Time Period Analysis of Stops & Number of Stops by Year,Month, Hour of the Day",
        STOPS_BY_YEAR_MONTH_HOUR,
    ),
    (
        "4. Violations with High Search and Arrest Rates",
        SEARCH_AND_ARREST_RANKS,
    ),
    (
        "5. Driver Demographics by Country (Age, Gender and Race)",
        DEMOGRAPHICS_BY_COUNTRY,
    ),
    (
        "6. Top 5 Violations with Highest Arrest Rates",
        VIOLATION_ARREST_RATES,
    ),
];
