pub mod ports;
pub mod aggregate_use_case;
pub mod merge_use_case;
pub mod industry_use_case;

use serde::Serialize;

/// Serialize records into the row shape accepted by the output port
pub(crate) fn to_rows<T: Serialize>(records: &[T]) -> serde_json::Result<Vec<serde_json::Value>> {
    records.iter().map(serde_json::to_value).collect()
}

#[cfg(test)]
pub(crate) mod test_support {
    use anyhow::Result;
    use async_trait::async_trait;
    use serde_json::Value;
    use std::collections::HashMap;
    use tokio::sync::Mutex;

    use crate::app::ports::{ExposureOutputPort, TableSourcePort};
    use crate::domain::{IndustryEmploymentRecord, LaborRecord, TaskRecord};
    use crate::manifest::{InputDigest, InputRole};

    #[derive(Default)]
    pub struct MemoryOutput {
        pub tables: Mutex<HashMap<String, Vec<Value>>>,
        /// Table names in write order
        pub table_writes: Mutex<Vec<String>>,
        pub documents: Mutex<HashMap<String, Value>>,
        pub texts: Mutex<HashMap<String, String>>,
    }

    #[async_trait]
    impl ExposureOutputPort for MemoryOutput {
        async fn write_table(&self, name: &str, rows: &[Value]) -> Result<String> {
            self.table_writes.lock().await.push(name.to_string());
            self.tables.lock().await.insert(name.to_string(), rows.to_vec());
            Ok(format!("memory://{}", name))
        }

        async fn write_document(&self, name: &str, document: &Value) -> Result<String> {
            self.documents.lock().await.insert(name.to_string(), document.clone());
            Ok(format!("memory://{}", name))
        }

        async fn write_text(&self, file_name: &str, contents: &str) -> Result<String> {
            self.texts.lock().await.insert(file_name.to_string(), contents.to_string());
            Ok(format!("memory://{}", file_name))
        }
    }

    #[derive(Default)]
    pub struct MemorySource {
        pub tasks: Vec<TaskRecord>,
        pub labor: Option<Vec<LaborRecord>>,
        pub industry: Option<Vec<IndustryEmploymentRecord>>,
        /// Make `load_labor` fail, as a malformed labor file would
        pub fail_labor: bool,
    }

    #[async_trait]
    impl TableSourcePort for MemorySource {
        async fn load_tasks(&self) -> Result<Vec<TaskRecord>> {
            Ok(self.tasks.clone())
        }

        async fn load_labor(&self) -> Result<Option<Vec<LaborRecord>>> {
            if self.fail_labor {
                anyhow::bail!("malformed labor table");
            }
            Ok(self.labor.clone())
        }

        async fn load_industry(&self) -> Result<Option<Vec<IndustryEmploymentRecord>>> {
            Ok(self.industry.clone())
        }

        async fn describe_inputs(&self, roles: &[InputRole]) -> Result<Vec<InputDigest>> {
            Ok(roles
                .iter()
                .filter(|role| match role {
                    InputRole::Tasks => true,
                    InputRole::Labor => self.labor.is_some(),
                    InputRole::Industry => self.industry.is_some(),
                })
                .map(|role| InputDigest::from_bytes(*role, "memory", b""))
                .collect())
        }
    }
}
