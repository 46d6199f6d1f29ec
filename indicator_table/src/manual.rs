/*!

This is the long-form manual for `indicator_table` and the `nfhs` command line.

## Input format

The input is a spreadsheet (`.xlsx`) or a comma-separated file (`.csv`) with a single header row.

* Three identifier columns: the state or union territory, the survey round and the area
  type. By default they are named `India/States/UTs`, `Survey` and `Area`, as in the National
  Family Health Survey fact sheets. Other names can be given in the configuration file.
* Columns whose name starts with `Note of` hold free-text notes and are dropped.
* Every other column is an indicator. Cells are percentages. A value in parentheses,
  such as `(45.6)`, is read as the number. Empty cells, `*`, `-` and `NA` are missing values.

Rows without any indicator value are dropped. The same (state, survey, area) may only appear
once: the load fails otherwise.

## Wide and long forms

The loaded table is in wide form: one record per (state, survey, area), one value per
indicator. [`to_long`](crate::to_long) turns it into one record per (state, survey, area,
indicator) with the missing values left out. Both forms implement
[`IndicatorView`](crate::IndicatorView) and answer the queries identically.

## Queries

* `point_value`: the value for one state, survey, area and indicator. If nothing is stored,
  the error is `TableErrors::NoData`. Show it as an empty state.
* `compare_across_entities`: all the states for one survey, area and indicator, from the
  highest value to the lowest.
* `trend_across_surveys`: the values for one state and area across the survey rounds. Rounds
  are ordered by their labels, comparing numbers by value (`NFHS-3`, `NFHS-4`, ...,
  `NFHS-10`), unless an explicit order is provided:

```
use indicator_table::builder::Builder;
use indicator_table::{IndicatorView, SurveyOrder, TableErrors};

let mut builder = Builder::new(&["Women who are literate (%)".to_string()])?;
builder.add_record("Kerala", "NFHS-5", "Total", &[Some(97.4)])?;
builder.add_record("Kerala", "NFHS-4", "Total", &[Some(97.9)])?;
let table = builder.build();

let order = SurveyOrder::Explicit(vec!["NFHS-4".to_string(), "NFHS-5".to_string()]);
let trend = table.trend_across_surveys("Kerala", "Total", "Women who are literate (%)", &order);
assert_eq!(trend[0].0, "NFHS-4");
# Ok::<(), TableErrors>(())
```

## Configuration file

```json
{
  "source": {
    "provider": "xlsx",
    "filePath": "All India National Family Health Survey4.xlsx",
    "entityColumn": "India/States/UTs",
    "surveyColumn": "Survey",
    "areaColumn": "Area",
    "annotationPrefix": "Note of"
  },
  "surveyOrder": ["NFHS-3", "NFHS-4", "NFHS-5"],
  "representation": "long"
}
```

The file path is relative to the configuration file. All the keys except `filePath` are
optional.

*/
