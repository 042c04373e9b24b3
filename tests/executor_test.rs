use CommentBlaster::data_model::Dataset;
use CommentBlaster::error::{PipelineError, Result};
use CommentBlaster::executor::{DatasetStep, PipelineExecutor};

// Helper function to create a single-column Dataset for testing
fn create_test_dataset(name: &str, comments: &[&str]) -> Dataset {
    Dataset::from_text_columns(
        name,
        vec![(
            "comment",
            comments.iter().map(|c| Some(c.to_string())).collect(),
        )],
    )
    .expect("valid test dataset")
}

// Mock DatasetStep that appends a suffix to every comment
struct AppendStep {
    name: &'static str,
    suffix: &'static str,
}

impl DatasetStep for AppendStep {
    fn name(&self) -> &'static str {
        self.name
    }

    fn process(&self, dataset: Dataset) -> Result<Dataset> {
        let values: Vec<String> = dataset
            .text_values("comment")?
            .into_iter()
            .map(|v| format!("{}{}", v.unwrap_or_default(), self.suffix))
            .collect();
        dataset.with_text_column("comment", values)
    }
}

struct ErrorStep;

impl DatasetStep for ErrorStep {
    fn name(&self) -> &'static str {
        "error_step"
    }

    fn process(&self, dataset: Dataset) -> Result<Dataset> {
        Err(PipelineError::MissingColumn {
            column: "absent".to_string(),
            dataset: dataset.name().to_string(),
        })
    }
}

#[test]
fn test_new_executor_with_empty_steps() {
    let executor = PipelineExecutor::new(vec![]);
    assert!(executor.step_names().is_empty());
}

#[test]
fn test_run_empty_pipeline_returns_input() {
    let executor = PipelineExecutor::new(vec![]);
    let ds = create_test_dataset("a.csv", &["one", "two"]);
    let out = executor.run(ds).unwrap();
    assert_eq!(
        out.text_values("comment").unwrap(),
        vec![Some("one".to_string()), Some("two".to_string())]
    );
}

#[test]
fn test_run_multiple_steps_in_order() {
    let steps: Vec<Box<dyn DatasetStep>> = vec![
        Box::new(AppendStep {
            name: "step1",
            suffix: " + step1",
        }),
        Box::new(AppendStep {
            name: "step2",
            suffix: " + step2",
        }),
    ];
    let executor = PipelineExecutor::new(steps);
    assert_eq!(executor.step_names(), vec!["step1", "step2"]);

    let out = executor
        .run(create_test_dataset("a.csv", &["initial"]))
        .unwrap();
    assert_eq!(
        out.text_values("comment").unwrap(),
        vec![Some("initial + step1 + step2".to_string())]
    );
}

#[test]
fn test_step_error_is_wrapped_and_stops_pipeline() {
    let steps: Vec<Box<dyn DatasetStep>> = vec![
        Box::new(AppendStep {
            name: "step_ok",
            suffix: " + ok",
        }),
        Box::new(ErrorStep),
        Box::new(AppendStep {
            name: "never_runs",
            suffix: " + never",
        }),
    ];
    let executor = PipelineExecutor::new(steps);
    let result = executor.run(create_test_dataset("broken.csv", &["x"]));

    match result {
        Err(PipelineError::StepError { step_name, source }) => {
            assert_eq!(step_name, "error_step");
            match *source {
                PipelineError::MissingColumn { dataset, .. } => assert_eq!(dataset, "broken.csv"),
                other => panic!("Expected MissingColumn source, got {:?}", other),
            }
        }
        other => panic!("Expected a StepError, but got {:?}", other),
    }
}
