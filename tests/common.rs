//! Common test utilities for building process definitions.
use kaidoku::prelude::*;
use serde_json::json;

/// Shorthand for a step with a parent and a sequence number.
#[allow(dead_code)]
pub fn step(id: &str, parent: &str, kind: &str, sequence: i64) -> StepRecord {
    StepRecord::new(id, kind)
        .with_parent(parent)
        .with_sequence(sequence)
}

/// A small nightly sales load, listed deliberately out of order.
///
/// ```text
/// 1 Group "Nightly load"
/// ├── 2 PurgeTable Stage          (seq 1)
/// ├── 3 ImportFile sales.csv      (seq 2)
/// ├── 4 SetVariable @Threshold    (seq 3)
/// ├── 5 FilterTable Stage         (seq 4, uses @Threshold)
/// ├── 6 Decision                  (seq 5, stored inactive)
/// │   ├── 7 Branch big            (seq 1)
/// │   │   └── 9 SendEmail         (seq 1)
/// │   └── 8 Branch otherwise      (seq 2)
/// └── 10 WarehouseImport          (no sequence)
/// 11 LogMessage                   (root, seq 2)
/// ```
#[allow(dead_code)]
pub fn sales_process() -> ProcessDefinition {
    ProcessDefinition::new(vec![
        StepRecord::new("10", "WarehouseImport")
            .with_parent("1")
            .with_name("Publish")
            .with_params(json!({
                "SourceTable": "Stage",
                "WarehouseName": "Sales",
                "TargetTable": "FactSales",
                "ImportMode": 3,
                "Mappings": [
                    { "SourceColumn": "amt", "TargetColumn": "Amount" },
                    { "SourceColumn": "amt", "TargetColumn": "Band",
                      "Expression": "IIF(amt > @Threshold, 'High', 'Low')" }
                ]
            })),
        step("9", "7", "SendEmail", 1)
            .with_name("Alert sales")
            .with_params(json!({ "To": "sales@example.com", "Subject": "Big day" })),
        step("5", "1", "FilterTable", 4)
            .with_name("Keep large orders")
            .with_params(json!({
                "SourceTable": "Stage",
                "CriteriaSet": {
                    "Criteria": { "Column": "amt", "Operator": ">=", "Value1": "@Threshold" }
                }
            })),
        step("1", "0", "Group", 1).with_name("Nightly load"),
        step("11", "0", "LogMessage", 2)
            .with_name("Done")
            .with_params(json!({ "Message": "Nightly load finished" })),
        step("2", "1", "PurgeTable", 1)
            .with_name("Clear stage")
            .with_params(json!({ "TableName": "Stage" })),
        step("3", "1", "ImportFile", 2)
            .with_name("Load sales file")
            .with_params(json!({ "FilePath": "/drop/sales.csv", "TargetTable": "Stage" })),
        step("4", "1", "SetVariable", 3)
            .with_name("Set threshold")
            .with_params(json!({
                "VariableName": "@Threshold",
                "VariableValue": "CASE WHEN Month = 12 THEN 5000 ELSE 1000 END"
            })),
        step("6", "1", "Decision", 5).with_name("Big day?").inactive(),
        step("7", "6", "Branch", 1)
            .with_name("Big")
            .with_params(json!({ "Condition": "Total > @Threshold" })),
        step("8", "6", "Branch", 2).with_name("Otherwise"),
    ])
}

/// The JSON form of a three-step export: child before parent, mixed
/// string/number field types, a spaced type tag and a numeric active flag.
#[allow(dead_code)]
pub const SMALL_EXPORT_JSON: &str = r#"{
    "Steps": {
        "Step": [
            { "Id": "20", "ParentId": "10", "StepType": "Set Variable", "Sequence": "2",
              "Name": "Pick tier", "Active": "true",
              "StorageObject": {
                "VariableName": "Tier",
                "VariableValue": "IIF(Spend > 1000, 'Gold', IIF(Spend > 100, 'Silver', 'Bronze'))"
              } },
            { "Id": 10, "ParentId": 0, "StepType": "Group", "Sequence": 1, "Name": "Pricing" },
            { "Id": 30, "ParentId": 10, "StepType": "query", "Sequence": 1, "Name": "Load spend",
              "Active": 0,
              "StorageObject": { "Sql": "SELECT Spend FROM Customers", "TargetTable": "Spend" } }
        ]
    }
}"#;
