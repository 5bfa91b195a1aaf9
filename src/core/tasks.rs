use crate::core::TaskRequest;
use crate::domain::model::Complexity;
use crate::utils::error::{FrameworkError, Result};
use std::path::Path;

/// 產生示範用的研究任務
pub fn sample_tasks(framework_id: u32, count: usize) -> Vec<TaskRequest> {
    (0..count)
        .map(|i| TaskRequest {
            task_id: Some(format!("research_{}_{}", framework_id, i)),
            data: Some(serde_json::Value::String(format!("sample_data_{}", i))),
            complexity: Some(Complexity::High),
            ..Default::default()
        })
        .collect()
}

pub fn parse_tasks(content: &str) -> Result<Vec<TaskRequest>> {
    let value: serde_json::Value = serde_json::from_str(content)?;

    if !value.is_array() {
        return Err(FrameworkError::TaskInputError {
            message: "expected a JSON array of task objects".to_string(),
        });
    }

    Ok(serde_json::from_value(value)?)
}

/// 從 JSON 檔案讀取任務清單
pub async fn load_tasks_file<P: AsRef<Path>>(path: P) -> Result<Vec<TaskRequest>> {
    let path = path.as_ref();
    let content = tokio::fs::read_to_string(path).await?;
    let tasks = parse_tasks(&content)?;

    tracing::info!("Loaded {} tasks from {}", tasks.len(), path.display());
    Ok(tasks)
}
