//! The filter form shown above the dashboard and the data it posts.

use std::collections::BTreeSet;

use maud::{Markup, html};
use serde::Deserialize;
use time::{Date, OffsetDateTime, macros::format_description};
use time_tz::Tz;

use crate::{
    Error, endpoints,
    filter::{Category, DateRange, FilterCriteria, FilterOptions},
    html::{BUTTON_PRIMARY_STYLE, BUTTON_SECONDARY_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE},
    timezone::{end_of_day, start_of_day, to_local},
};

/// The fields posted by the filter form.
///
/// The dates are `YYYY-MM-DD` strings from date inputs and may be empty. The
/// category fields repeat once per checked box.
#[derive(Debug, Default, Deserialize)]
pub struct FilterForm {
    /// The first day to include.
    #[serde(default)]
    pub start_date: String,
    /// The last day to include.
    #[serde(default)]
    pub end_date: String,
    /// Checked accounts.
    #[serde(default)]
    pub accounts: Vec<String>,
    /// Checked industries.
    #[serde(default)]
    pub industries: Vec<String>,
    /// Checked states.
    #[serde(default)]
    pub states: Vec<String>,
}

impl FilterForm {
    /// Convert the form to filter criteria.
    ///
    /// The start date begins at midnight and the end date ends at 23:59:59.999,
    /// both in `timezone` with the offset in force on that day.
    ///
    /// # Errors
    /// Returns [Error::InvalidDate] if a date is not in the format `YYYY-MM-DD`.
    pub fn into_criteria(self, timezone: &Tz) -> Result<FilterCriteria, Error> {
        let start = parse_form_date(&self.start_date)?.map(|date| start_of_day(date, timezone));
        let end = parse_form_date(&self.end_date)?.map(|date| end_of_day(date, timezone));

        Ok(FilterCriteria {
            accounts: self.accounts.into_iter().collect(),
            industries: self.industries.into_iter().collect(),
            states: self.states.into_iter().collect(),
            date_range: DateRange { start, end },
        })
    }
}

fn parse_form_date(text: &str) -> Result<Option<Date>, Error> {
    let text = text.trim();

    if text.is_empty() {
        return Ok(None);
    }

    Date::parse(text, format_description!("[year]-[month]-[day]"))
        .map(Some)
        .map_err(|_| Error::InvalidDate(text.to_owned()))
}

fn format_form_date(date_time: Option<OffsetDateTime>, timezone: &Tz) -> String {
    date_time
        .map(|date_time| {
            let date = to_local(date_time, timezone).date();
            format!(
                "{:04}-{:02}-{:02}",
                date.year(),
                u8::from(date.month()),
                date.day()
            )
        })
        .unwrap_or_default()
}

/// Renders the filter form with the current `criteria` filled in.
///
/// Labels that are selected but missing from `options` are still listed so
/// that a saved selection stays visible and can be unchecked.
pub(super) fn filter_form_view(
    criteria: &FilterCriteria,
    options: &FilterOptions,
    timezone: &Tz,
) -> Markup {
    let start_date = format_form_date(criteria.date_range.start, timezone);
    let end_date = format_form_date(criteria.date_range.end, timezone);

    html! {
        form
            id="filter-form"
            hx-post=(endpoints::FILTERS_API)
            hx-target="#dashboard-content"
            hx-target-error="#alert-container"
            hx-swap="innerHTML"
            class="w-full mb-8 bg-gray-50 dark:bg-gray-800 p-4 rounded-lg"
        {
            h3 class="text-xl font-semibold mb-4" { "Filters" }

            div class="grid grid-cols-1 md:grid-cols-2 gap-4 mb-4"
            {
                div
                {
                    label for="start_date" class=(FORM_LABEL_STYLE) { "From" }
                    input
                        type="date"
                        id="start_date"
                        name="start_date"
                        value=(start_date)
                        class=(FORM_TEXT_INPUT_STYLE);
                }

                div
                {
                    label for="end_date" class=(FORM_LABEL_STYLE) { "To" }
                    input
                        type="date"
                        id="end_date"
                        name="end_date"
                        value=(end_date)
                        class=(FORM_TEXT_INPUT_STYLE);
                }
            }

            div class="grid grid-cols-1 md:grid-cols-3 gap-4 mb-4"
            {
                (category_fieldset("Accounts", "accounts", Category::Account, criteria, options))
                (category_fieldset("Industries", "industries", Category::Industry, criteria, options))
                (category_fieldset("States", "states", Category::State, criteria, options))
            }

            div class="flex flex-col sm:flex-row gap-4"
            {
                button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Apply Filters" }

                button
                    type="button"
                    hx-post=(endpoints::CLEAR_FILTERS_API)
                    hx-target-error="#alert-container"
                    class=(BUTTON_SECONDARY_STYLE)
                {
                    "Clear Filters"
                }
            }
        }
    }
}

fn category_fieldset(
    legend: &str,
    field_name: &str,
    category: Category,
    criteria: &FilterCriteria,
    options: &FilterOptions,
) -> Markup {
    let selected = criteria.selected(category);
    let labels: BTreeSet<&str> = options
        .labels(category)
        .iter()
        .chain(selected)
        .map(String::as_str)
        .collect();

    html! {
        fieldset class="max-h-60 overflow-y-auto"
        {
            legend class=(FORM_LABEL_STYLE) { (legend) }

            @if labels.is_empty() {
                p class="text-sm text-gray-600 dark:text-gray-400" { "Nothing to filter by" }
            }

            @for label in labels {
                label class="flex items-center space-x-2 mb-1"
                {
                    input
                        type="checkbox"
                        name=(field_name)
                        value=(label)
                        checked[selected.contains(label)]
                        class="rounded-sm border-gray-300
                            text-blue-600 shadow-xs
                            focus:border-blue-300 focus:ring-3
                            focus:ring-blue-200/50"
                    ;

                    span class="text-sm" { (label) }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use scraper::{Html, Selector};
    use time::macros::datetime;
    use time_tz::Tz;

    use crate::{
        Error,
        filter::{DateRange, FilterCriteria, FilterOptions},
        timezone::get_timezone,
        transaction::{Transaction, TransactionType},
    };

    fn utc() -> &'static Tz {
        get_timezone("Etc/UTC").unwrap()
    }

    use super::{FilterForm, filter_form_view};

    #[test]
    fn form_handles_repeated_and_missing_fields() {
        let form: FilterForm = serde_html_form::from_str(
            "start_date=2024-01-01&end_date=2024-01-31&accounts=Acme&accounts=Globex&states=NY",
        )
        .unwrap();
        assert_eq!(form.accounts, vec!["Acme", "Globex"]);
        assert_eq!(form.states, vec!["NY"]);
        assert!(form.industries.is_empty());

        let form: FilterForm = serde_html_form::from_str("").unwrap();
        assert!(form.start_date.is_empty());
        assert!(form.accounts.is_empty());
    }

    #[test]
    fn dates_cover_whole_local_days() {
        let auckland = get_timezone("Pacific/Auckland").unwrap();
        let form = FilterForm {
            start_date: "2024-01-01".to_owned(),
            end_date: "2024-01-31".to_owned(),
            ..Default::default()
        };

        let criteria = form.into_criteria(auckland).unwrap();

        assert_eq!(
            criteria.date_range,
            DateRange::new(
                datetime!(2024-01-01 00:00 +13),
                datetime!(2024-01-31 23:59:59.999 +13)
            )
        );
    }

    #[test]
    fn winter_range_uses_winter_offset() {
        let auckland = get_timezone("Pacific/Auckland").unwrap();
        let form = FilterForm {
            start_date: "2024-07-01".to_owned(),
            end_date: "2024-07-31".to_owned(),
            ..Default::default()
        };

        let criteria = form.into_criteria(auckland).unwrap();

        assert_eq!(
            criteria.date_range,
            DateRange::new(
                datetime!(2024-07-01 00:00 +12),
                datetime!(2024-07-31 23:59:59.999 +12)
            )
        );
        let at = |date| Transaction::build(100, date, TransactionType::Deposit).finalize();
        // 23:30 local time on the last day and on the day before the first.
        assert!(criteria.matches(&at(datetime!(2024-07-31 11:30 UTC))));
        assert!(!criteria.matches(&at(datetime!(2024-06-30 11:30 UTC))));

        let html = Html::parse_fragment(
            &filter_form_view(&criteria, &FilterOptions::default(), auckland).into_string(),
        );
        let start = Selector::parse("input[name=start_date]").unwrap();
        let start = html.select(&start).next().unwrap();
        assert_eq!(start.value().attr("value"), Some("2024-07-01"));
        let end = Selector::parse("input[name=end_date]").unwrap();
        let end = html.select(&end).next().unwrap();
        assert_eq!(end.value().attr("value"), Some("2024-07-31"));
    }

    #[test]
    fn empty_dates_leave_range_open() {
        let form = FilterForm {
            start_date: "2024-01-10".to_owned(),
            industries: vec!["Retail".to_owned()],
            ..Default::default()
        };

        let criteria = form.into_criteria(utc()).unwrap();

        assert_eq!(criteria.date_range.end, None);
        assert!(criteria.industries.contains("Retail"));
    }

    #[test]
    fn invalid_date_is_rejected() {
        let form = FilterForm {
            start_date: "01/02/2024".to_owned(),
            ..Default::default()
        };

        assert_eq!(
            form.into_criteria(utc()),
            Err(Error::InvalidDate("01/02/2024".to_owned()))
        );
    }

    #[test]
    fn view_checks_selected_labels_and_keeps_missing_ones() {
        let criteria = FilterCriteria {
            accounts: ["Acme".to_owned(), "Closed Account".to_owned()].into(),
            date_range: DateRange::new(
                datetime!(2024-01-01 00:00 UTC),
                datetime!(2024-01-31 23:59:59.999 UTC),
            ),
            ..Default::default()
        };
        let options = FilterOptions {
            accounts: vec!["Acme".to_owned(), "Globex".to_owned()],
            industries: vec!["Retail".to_owned()],
            states: vec![],
        };

        let html = Html::parse_fragment(
            &filter_form_view(&criteria, &options, utc()).into_string(),
        );

        let checkbox = Selector::parse("input[type=checkbox][name=accounts]").unwrap();
        let accounts: Vec<(&str, bool)> = html
            .select(&checkbox)
            .map(|input| {
                (
                    input.value().attr("value").unwrap(),
                    input.value().attr("checked").is_some(),
                )
            })
            .collect();
        assert_eq!(
            accounts,
            vec![("Acme", true), ("Closed Account", true), ("Globex", false)]
        );

        let start = Selector::parse("input[name=start_date]").unwrap();
        let start = html.select(&start).next().unwrap();
        assert_eq!(start.value().attr("value"), Some("2024-01-01"));
        let end = Selector::parse("input[name=end_date]").unwrap();
        let end = html.select(&end).next().unwrap();
        assert_eq!(end.value().attr("value"), Some("2024-01-31"));
    }
}
