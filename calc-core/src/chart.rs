//! Declarative chart specifications.
//!
//! A [`ChartSpec`] is handed to whatever renders charts. It is built only from
//! numbers already present in a calculator's result, never by re-running the
//! formula.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartKind {
    Line,
    Bar,
    Pie,
    Gauge,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Axis {
    pub label: String,
    /// Category labels. Empty for a plain numeric axis.
    pub categories: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Series {
    pub name: String,
    /// One value per x-axis category, in order.
    pub data: Vec<f64>,
}

/// A labelled reference value, e.g. a category threshold on a gauge.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Marker {
    pub label: String,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSpec {
    pub kind: ChartKind,
    pub title: String,
    pub x_axis: Axis,
    pub y_axis: Axis,
    pub series: Vec<Series>,
    pub markers: Vec<Marker>,
}

impl ChartSpec {
    pub fn new(
        kind: ChartKind,
        title: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            title: title.into(),
            x_axis: Axis::default(),
            y_axis: Axis::default(),
            series: Vec::new(),
            markers: Vec::new(),
        }
    }

    pub fn x_axis<I, S>(
        mut self,
        label: impl Into<String>,
        categories: I,
    ) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.x_axis = Axis {
            label: label.into(),
            categories: categories.into_iter().map(Into::into).collect(),
        };
        self
    }

    pub fn y_axis(
        mut self,
        label: impl Into<String>,
    ) -> Self {
        self.y_axis.label = label.into();
        self
    }

    pub fn series(
        mut self,
        name: impl Into<String>,
        data: Vec<f64>,
    ) -> Self {
        self.series.push(Series {
            name: name.into(),
            data,
        });
        self
    }

    pub fn marker(
        mut self,
        label: impl Into<String>,
        value: f64,
    ) -> Self {
        self.markers.push(Marker {
            label: label.into(),
            value,
        });
        self
    }

    /// Looks up a series by name.
    pub fn find_series(
        &self,
        name: &str,
    ) -> Option<&Series> {
        self.series.iter().find(|s| s.name == name)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn builder_collects_axes_series_and_markers() {
        let chart = ChartSpec::new(ChartKind::Bar, "Scores")
            .x_axis("Round", ["1", "2"])
            .y_axis("Differential")
            .series("differential", vec![10.5, 12.0])
            .marker("average", 11.25);

        assert_eq!(chart.x_axis.categories, vec!["1", "2"]);
        assert_eq!(chart.y_axis.label, "Differential");
        assert_eq!(
            chart.find_series("differential").map(|s| s.data.clone()),
            Some(vec![10.5, 12.0])
        );
        assert_eq!(chart.markers.len(), 1);
        assert!(chart.find_series("missing").is_none());
    }
}
