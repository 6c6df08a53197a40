//! Weighted course grade and grade point average.

use serde::{Deserialize, Serialize};

use crate::calculator::{Calculator, ResultField};
use crate::chart::{ChartKind, ChartSpec};
use crate::error::CalcError;
use crate::format::round_to;
use crate::validation::{Bounds, FieldSpec, RawInput, row_number};

const WEIGHT_TOLERANCE: f64 = 1e-6;

const SCORE: Bounds = Bounds::new(0.0, 150.0);
const WEIGHT: Bounds = Bounds::PERCENT;
const CREDITS: Bounds = Bounds::new(0.0, 20.0);

choice_enum! {
    pub enum LetterGrade ("letter grade") {
        APlus => "A+",
        A => "A",
        AMinus => "A-",
        BPlus => "B+",
        B => "B",
        BMinus => "B-",
        CPlus => "C+",
        C => "C",
        CMinus => "C-",
        DPlus => "D+",
        D => "D",
        DMinus => "D-",
        F => "F",
    }
}

impl LetterGrade {
    /// Grade points on the 4.0 scale.
    pub fn points(&self) -> f64 {
        match self {
            Self::APlus | Self::A => 4.0,
            Self::AMinus => 3.7,
            Self::BPlus => 3.3,
            Self::B => 3.0,
            Self::BMinus => 2.7,
            Self::CPlus => 2.3,
            Self::C => 2.0,
            Self::CMinus => 1.7,
            Self::DPlus => 1.3,
            Self::D => 1.0,
            Self::DMinus => 0.7,
            Self::F => 0.0,
        }
    }

    /// Letter for a percentage score.
    ///
    /// ```
    /// use calc_core::calculators::grades::LetterGrade;
    ///
    /// assert_eq!(LetterGrade::from_percent(97.0), LetterGrade::APlus);
    /// assert_eq!(LetterGrade::from_percent(89.99), LetterGrade::BPlus);
    /// assert_eq!(LetterGrade::from_percent(59.0), LetterGrade::F);
    /// ```
    pub fn from_percent(score: f64) -> Self {
        const CUTOFFS: [(f64, LetterGrade); 12] = [
            (97.0, LetterGrade::APlus),
            (93.0, LetterGrade::A),
            (90.0, LetterGrade::AMinus),
            (87.0, LetterGrade::BPlus),
            (83.0, LetterGrade::B),
            (80.0, LetterGrade::BMinus),
            (77.0, LetterGrade::CPlus),
            (73.0, LetterGrade::C),
            (70.0, LetterGrade::CMinus),
            (67.0, LetterGrade::DPlus),
            (63.0, LetterGrade::D),
            (60.0, LetterGrade::DMinus),
        ];
        CUTOFFS
            .iter()
            .find(|(cutoff, _)| score >= *cutoff)
            .map_or(Self::F, |(_, grade)| *grade)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Weighted grade
// ─────────────────────────────────────────────────────────────────────────────

static GRADE_SCHEMA: [FieldSpec; 1] = [FieldSpec::rows(
    "components",
    "Assignments",
    &["score", "weight"],
)];

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Component {
    /// Percent.
    pub score: f64,
    /// Share of the final grade, percent.
    pub weight: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradeInput {
    pub components: Vec<Component>,
}

impl Default for GradeInput {
    fn default() -> Self {
        Self {
            components: vec![
                Component {
                    score: 90.0,
                    weight: 30.0,
                },
                Component {
                    score: 85.0,
                    weight: 30.0,
                },
                Component {
                    score: 78.0,
                    weight: 40.0,
                },
            ],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradeResult {
    pub average: f64,
    pub letter: LetterGrade,
    pub points: f64,
    /// Weighted contribution of each component, percentage points.
    pub contributions: Vec<f64>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct GradeCalculator;

impl Calculator for GradeCalculator {
    type Input = GradeInput;
    type Output = GradeResult;

    const ID: &'static str = "grade";
    const TITLE: &'static str = "Weighted Grade Calculator";

    fn schema() -> &'static [FieldSpec] {
        &GRADE_SCHEMA
    }

    fn from_raw(raw: &RawInput) -> Result<GradeInput, CalcError> {
        let Some(rows) = raw.rows("components")? else {
            return Ok(GradeInput::default());
        };
        let components = rows
            .iter()
            .enumerate()
            .map(|(i, row)| {
                Ok(Component {
                    score: row_number("components", row, 0, i)?,
                    weight: row_number("components", row, 1, i)?,
                })
            })
            .collect::<Result<Vec<_>, CalcError>>()?;
        Ok(GradeInput { components })
    }

    fn validate(input: &GradeInput) -> Result<(), CalcError> {
        if input.components.is_empty() {
            return Err(CalcError::Required {
                field: "components".to_string(),
            });
        }
        for (i, component) in input.components.iter().enumerate() {
            SCORE.check(&format!("score (row {})", i + 1), component.score)?;
            WEIGHT.check(&format!("weight (row {})", i + 1), component.weight)?;
        }
        let total: f64 = input.components.iter().map(|c| c.weight).sum();
        if (total - 100.0).abs() > WEIGHT_TOLERANCE {
            return Err(CalcError::WeightsDoNotSum { total });
        }
        Ok(())
    }

    fn compute(input: &GradeInput) -> Result<GradeResult, CalcError> {
        let contributions: Vec<f64> = input
            .components
            .iter()
            .map(|c| c.score * c.weight / 100.0)
            .collect();
        let average: f64 = contributions.iter().sum();
        let letter = LetterGrade::from_percent(average);

        Ok(GradeResult {
            average,
            letter,
            points: letter.points(),
            contributions,
        })
    }

    fn fields(output: &GradeResult) -> Vec<ResultField> {
        vec![
            ResultField::number("average", output.average).with_unit("%"),
            ResultField::text("letter", output.letter.as_str()),
            ResultField::number("grade_points", output.points),
        ]
    }

    fn chart(output: &GradeResult) -> Option<ChartSpec> {
        let labels = (1..=output.contributions.len()).map(|n| format!("#{n}"));
        Some(
            ChartSpec::new(ChartKind::Bar, "Contribution to final grade")
                .x_axis("Assignment", labels)
                .y_axis("Percentage points")
                .series(
                    "contribution",
                    output.contributions.iter().map(|c| round_to(*c, 2)).collect(),
                ),
        )
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// GPA
// ─────────────────────────────────────────────────────────────────────────────

static GPA_SCHEMA: [FieldSpec; 1] = [FieldSpec::rows(
    "courses",
    "Courses",
    &["grade", "credits"],
)];

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Course {
    pub grade: LetterGrade,
    pub credits: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GpaInput {
    pub courses: Vec<Course>,
}

impl Default for GpaInput {
    fn default() -> Self {
        let course = |grade, credits| Course { grade, credits };
        Self {
            courses: vec![
                course(LetterGrade::A, 3.0),
                course(LetterGrade::BPlus, 4.0),
                course(LetterGrade::AMinus, 3.0),
                course(LetterGrade::B, 2.0),
            ],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GpaResult {
    pub gpa: f64,
    pub total_credits: f64,
    pub quality_points: f64,
    pub per_course: Vec<f64>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct GpaCalculator;

impl Calculator for GpaCalculator {
    type Input = GpaInput;
    type Output = GpaResult;

    const ID: &'static str = "gpa";
    const TITLE: &'static str = "GPA Calculator";

    fn schema() -> &'static [FieldSpec] {
        &GPA_SCHEMA
    }

    fn from_raw(raw: &RawInput) -> Result<GpaInput, CalcError> {
        let Some(rows) = raw.rows("courses")? else {
            return Ok(GpaInput::default());
        };
        let courses = rows
            .iter()
            .enumerate()
            .map(|(i, row)| {
                let grade = row.first().ok_or_else(|| CalcError::Required {
                    field: format!("courses row {}", i + 1),
                })?;
                Ok(Course {
                    grade: grade.parse()?,
                    credits: row_number("courses", row, 1, i)?,
                })
            })
            .collect::<Result<Vec<_>, CalcError>>()?;
        Ok(GpaInput { courses })
    }

    fn validate(input: &GpaInput) -> Result<(), CalcError> {
        for (i, course) in input.courses.iter().enumerate() {
            CREDITS.check(&format!("credits (row {})", i + 1), course.credits)?;
        }
        let total: f64 = input.courses.iter().map(|c| c.credits).sum();
        if total <= 0.0 {
            return Err(CalcError::domain("total credits must be greater than zero"));
        }
        Ok(())
    }

    fn compute(input: &GpaInput) -> Result<GpaResult, CalcError> {
        let per_course: Vec<f64> = input
            .courses
            .iter()
            .map(|c| c.grade.points() * c.credits)
            .collect();
        let quality_points: f64 = per_course.iter().sum();
        let total_credits: f64 = input.courses.iter().map(|c| c.credits).sum();

        Ok(GpaResult {
            gpa: quality_points / total_credits,
            total_credits,
            quality_points,
            per_course,
        })
    }

    fn fields(output: &GpaResult) -> Vec<ResultField> {
        vec![
            ResultField::number("gpa", output.gpa),
            ResultField::number("total_credits", output.total_credits),
            ResultField::number("quality_points", output.quality_points),
        ]
    }

    fn chart(output: &GpaResult) -> Option<ChartSpec> {
        let labels = (1..=output.per_course.len()).map(|n| format!("Course {n}"));
        Some(
            ChartSpec::new(ChartKind::Bar, "Quality points per course")
                .x_axis("Course", labels)
                .series("quality_points", output.per_course.clone())
                .marker("GPA", round_to(output.gpa, 2)),
        )
    }
}
