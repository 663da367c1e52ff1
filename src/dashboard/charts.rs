//! Chart generation and rendering for the dashboard.
//!
//! This module creates interactive ECharts visualizations of the filtered transactions:
//! - **Cash Flow**: net amount per day
//! - **Income vs Expenses**: deposits and withdrawals per day, side by side
//! - **Monthly Totals**: net amount per month
//! - **Top Industries** and **Top States**: the ten largest groups by amount
//!
//! Each chart is generated as JSON configuration for the ECharts library and
//! rendered as an HTML container plus an inline initialization script, so the
//! charts also come back to life when htmx swaps in new dashboard content.

use charming::{
    Chart,
    component::{Axis, Grid, Legend, Title},
    element::{
        AxisLabel, AxisPointer, AxisPointerType, AxisType, Emphasis, EmphasisFocus, ItemStyle,
        JsFunction, Tooltip, Trigger,
    },
    series::{Line, Pie, bar},
};
use maud::{Markup, PreEscaped, html};

use crate::dashboard::{
    aggregation::{CategoryTotal, DayDepositsWithdraws, DayTotal, MonthTotal},
    summary::DashboardSummary,
};

/// A dashboard chart with its HTML container ID and ECharts configuration.
pub(super) struct DashboardChart {
    /// The HTML element ID to use for the chart (kebab-case)
    pub id: &'static str,
    /// The ECharts configuration as a JSON string
    pub options: String,
}

/// Creates the five dashboard charts for `summary`.
pub(super) fn build_dashboard_charts(summary: &DashboardSummary) -> [DashboardChart; 5] {
    let currency = summary.currency.as_str();

    [
        DashboardChart {
            id: "cash-flow-chart",
            options: cash_flow_chart(&summary.daily_cash_flow, currency).to_string(),
        },
        DashboardChart {
            id: "income-expense-chart",
            options: income_expense_chart(&summary.daily_deposits_withdraws, currency).to_string(),
        },
        DashboardChart {
            id: "monthly-chart",
            options: monthly_chart(&summary.monthly_totals, currency).to_string(),
        },
        DashboardChart {
            id: "industry-chart",
            options: category_chart("Top Industries", &summary.top_industries, currency)
                .to_string(),
        },
        DashboardChart {
            id: "state-chart",
            options: category_chart("Top States", &summary.top_states, currency).to_string(),
        },
    ]
}

/// Renders the chart containers followed by the script that draws them.
pub(super) fn charts_view(charts: &[DashboardChart]) -> Markup {
    html!(
        section
            id="charts"
            class="w-full mx-auto mb-4"
        {
            div class="grid grid-cols-1 xl:grid-cols-2 gap-4"
            {
                @for chart in charts {
                    div
                        id=(chart.id)
                        class="chart min-h-[380px] rounded dark:bg-gray-100"
                    {}
                }
            }
        }

        (charts_script(charts))
    )
}

/// Generates JavaScript initialization code for dashboard charts.
///
/// Any chart already drawn in the same container is disposed first, which
/// happens when the filter form swaps in new content.
fn charts_script(charts: &[DashboardChart]) -> Markup {
    let script_content = charts
        .iter()
        .map(|chart| {
            format!(
                r#"(function() {{
                    const chartDom = document.getElementById("{}");
                    const previous = echarts.getInstanceByDom(chartDom);
                    if (previous) {{
                        previous.dispose();
                    }}
                    const chart = echarts.init(chartDom);
                    const option = {};
                    chart.setOption(option);

                    window.addEventListener('resize', () => chart.resize());

                    const darkModeMediaQuery = window.matchMedia('(prefers-color-scheme: dark)');
                    const updateTheme = () => {{
                        const isDarkMode = darkModeMediaQuery.matches;
                        chart.setTheme(isDarkMode ? 'dark' : 'default');
                    }}
                    darkModeMediaQuery.addEventListener('change', updateTheme);
                    updateTheme();
                }})();"#,
                chart.id,
                // Labels come from the data, keep them from closing the script tag.
                chart.options.replace("</", "<\\/")
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    html!(
        script { (PreEscaped(script_content)) }
    )
}

fn cash_flow_chart(days: &[DayTotal], currency: &str) -> Chart {
    let labels: Vec<String> = days.iter().map(DayTotal::label).collect();
    let values: Vec<f64> = days.iter().map(|day| day.total).collect();

    Chart::new()
        .title(Title::new().text("Cash Flow").subtext("Net amount per day"))
        .tooltip(currency_tooltip(currency))
        .grid(default_grid())
        .x_axis(Axis::new().type_(AxisType::Category).data(labels))
        .y_axis(currency_axis(currency))
        .series(Line::new().name("Cash Flow").data(values))
}

fn income_expense_chart(days: &[DayDepositsWithdraws], currency: &str) -> Chart {
    let labels: Vec<String> = days.iter().map(DayDepositsWithdraws::label).collect();
    let deposits: Vec<f64> = days.iter().map(|day| day.deposits).collect();
    let withdraws: Vec<f64> = days.iter().map(|day| day.withdraws).collect();

    Chart::new()
        .title(Title::new().text("Income vs Expenses").subtext("Per day"))
        .tooltip(currency_tooltip(currency))
        .legend(Legend::new().right("4%"))
        .grid(default_grid())
        .x_axis(Axis::new().type_(AxisType::Category).data(labels))
        .y_axis(currency_axis(currency))
        .series(
            bar::Bar::new()
                .name("Income")
                .item_style(ItemStyle::new().color("#16a34a"))
                .emphasis(Emphasis::new().focus(EmphasisFocus::Series))
                .data(deposits),
        )
        .series(
            bar::Bar::new()
                .name("Expenses")
                .item_style(ItemStyle::new().color("#dc2626"))
                .emphasis(Emphasis::new().focus(EmphasisFocus::Series))
                .data(withdraws),
        )
}

fn monthly_chart(months: &[MonthTotal], currency: &str) -> Chart {
    let labels: Vec<String> = months.iter().map(MonthTotal::label).collect();
    let values: Vec<f64> = months.iter().map(|month| month.total).collect();

    Chart::new()
        .title(Title::new().text("Monthly Totals").subtext("Net amount per month"))
        .tooltip(currency_tooltip(currency))
        .grid(default_grid())
        .x_axis(Axis::new().type_(AxisType::Category).data(labels))
        .y_axis(currency_axis(currency))
        .series(bar::Bar::new().name("Net Total").data(values))
}

fn category_chart(title: &str, totals: &[CategoryTotal], currency: &str) -> Chart {
    let data: Vec<(f64, &str)> = totals
        .iter()
        .map(|total| (total.total, total.name.as_str()))
        .collect();

    Chart::new()
        .title(Title::new().text(title).subtext("Ten largest by amount"))
        .tooltip(
            Tooltip::new()
                .trigger(Trigger::Item)
                .value_formatter(currency_formatter(currency)),
        )
        .legend(Legend::new().bottom("0%"))
        .series(
            Pie::new()
                .name(title)
                .radius(vec!["35%", "65%"])
                .data(data),
        )
}

fn default_grid() -> Grid {
    Grid::new()
        .left("3%")
        .right("4%")
        .bottom("3%")
        .contain_label(true)
}

fn currency_axis(currency: &str) -> Axis {
    Axis::new()
        .type_(AxisType::Value)
        .axis_label(AxisLabel::new().formatter(currency_formatter(currency)))
}

/// `currency` must be a three letter code, it is pasted into the script.
fn currency_formatter(currency: &str) -> JsFunction {
    JsFunction::new_with_args(
        "number",
        &format!(
            "const currencyFormatter = new Intl.NumberFormat('en-US', {{
              style: 'currency',
              currency: '{currency}'
            }});
            return (number) ? currencyFormatter.format(number) : \"-\";"
        ),
    )
}

/// Creates a tooltip configuration for currency values
fn currency_tooltip(currency: &str) -> Tooltip {
    Tooltip::new()
        .trigger(Trigger::Axis)
        .value_formatter(currency_formatter(currency))
        .axis_pointer(AxisPointer::new().type_(AxisPointerType::Shadow))
}
