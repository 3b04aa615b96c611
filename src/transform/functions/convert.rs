//! Summary → Sum conversions.
//!
//! These are the only editors that add instruments. Each qualifying summary
//! point contributes one Sum point to a single new metric per source
//! instrument, named after the source with a `_count` or `_sum` suffix. The
//! new metric lands in the same scope after the current pass over it, so
//! later statements see it but the pass that created it does not.

use super::{ArgumentList, Compiled, Editor, Function, Parameter, ParameterKind};
use crate::core::{Result, TransformError};
use crate::model::{
    AggregationTemporality, Metric, MetricData, NumberDataPoint, NumberValue, Sum,
    SummaryDataPoint,
};
use crate::transform::context::{Outcome, TransformContext};

const PARAMETERS: &[Parameter] = &[
    Parameter {
        keyword: "aggregation_temporality",
        kind: ParameterKind::String,
        required: true,
        variadic: false,
    },
    Parameter {
        keyword: "is_monotonic",
        kind: ParameterKind::Bool,
        required: true,
        variadic: false,
    },
];

/// Which summary field becomes the Sum value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SummaryField {
    Count,
    Sum,
}

impl SummaryField {
    fn suffix(self) -> &'static str {
        match self {
            SummaryField::Count => "_count",
            SummaryField::Sum => "_sum",
        }
    }

    fn value(self, dp: &SummaryDataPoint) -> NumberValue {
        match self {
            SummaryField::Count => NumberValue::Int(i64::try_from(dp.count).unwrap_or(i64::MAX)),
            SummaryField::Sum => NumberValue::Double(dp.sum),
        }
    }
}

fn compile_conversion(
    function: &'static str,
    field: SummaryField,
    mut arguments: ArgumentList,
) -> Result<Compiled> {
    let temporality = arguments.required_string("aggregation_temporality")?;
    let is_monotonic = arguments.required_bool("is_monotonic")?;
    let aggregation_temporality = AggregationTemporality::parse(&temporality).ok_or_else(|| {
        TransformError::invalid_argument(
            function,
            format!(
                "unknown aggregation temporality '{}', expected \"delta\" or \"cumulative\"",
                temporality
            ),
        )
    })?;

    Ok(Compiled::Editor(Box::new(ConvertSummaryFn {
        field,
        aggregation_temporality,
        is_monotonic,
    })))
}

// --- convert_summary_count_val_to_sum ---
/// `convert_summary_count_val_to_sum(temporality, monotonic)`: copy each
/// summary point's count into a new `<name>_count` Sum
#[derive(Clone, Copy, Debug)]
pub struct ConvertSummaryCountValToSum;

impl Function for ConvertSummaryCountValToSum {
    fn identifier(&self) -> &'static str {
        "convert_summary_count_val_to_sum"
    }

    fn parameters(&self) -> &'static [Parameter] {
        PARAMETERS
    }

    fn compile(&self, arguments: ArgumentList) -> Result<Compiled> {
        compile_conversion(self.identifier(), SummaryField::Count, arguments)
    }
}

// --- convert_summary_sum_val_to_sum ---
/// Same as [`ConvertSummaryCountValToSum`] for the sum field, producing `<name>_sum`
#[derive(Clone, Copy, Debug)]
pub struct ConvertSummarySumValToSum;

impl Function for ConvertSummarySumValToSum {
    fn identifier(&self) -> &'static str {
        "convert_summary_sum_val_to_sum"
    }

    fn parameters(&self) -> &'static [Parameter] {
        PARAMETERS
    }

    fn compile(&self, arguments: ArgumentList) -> Result<Compiled> {
        compile_conversion(self.identifier(), SummaryField::Sum, arguments)
    }
}

#[derive(Debug)]
struct ConvertSummaryFn {
    field: SummaryField,
    aggregation_temporality: AggregationTemporality,
    is_monotonic: bool,
}

impl Editor for ConvertSummaryFn {
    fn apply(&self, ctx: &mut TransformContext<'_>) -> Outcome {
        let Some(dp) = ctx.summary_point() else {
            return Outcome::Skipped("metric is not a summary");
        };

        let point = NumberDataPoint {
            attributes: dp.attributes.clone(),
            start_time_unix_nano: dp.start_time_unix_nano,
            time_unix_nano: dp.time_unix_nano,
            value: Some(self.field.value(dp)),
        };
        let source = ctx.metric();
        let name = format!("{}{}", source.name, self.field.suffix());
        let description = source.description.clone();
        let unit = source.unit.clone();

        let emitted = ctx.emitted_mut();
        let existing = emitted
            .iter_mut()
            .filter(|metric| metric.name == name)
            .find_map(|metric| match &mut metric.data {
                MetricData::Sum(sum) => Some(sum),
                _ => None,
            });
        match existing {
            Some(sum) => sum.data_points.push(point),
            None => emitted.push(Metric {
                name,
                description,
                unit,
                data: MetricData::Sum(Sum {
                    aggregation_temporality: self.aggregation_temporality,
                    is_monotonic: self.is_monotonic,
                    data_points: vec![point],
                }),
            }),
        }
        Outcome::Applied
    }
}
