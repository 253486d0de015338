use clap::Parser;
use kaidoku::process::StepRecord;
use rand::rngs::StdRng;
use rand::seq::{IndexedRandom, SliceRandom};
use rand::{Rng, SeedableRng};
use serde_json::{Value, json};
use std::fs;

const TABLES: &[&str] = &["Orders", "Customers", "Products", "Invoices", "Regions", "Returns"];
const COLUMNS: &[&str] = &["Amount", "Status", "Region", "Qty", "Discount", "Score"];
const OPERATORS: &[&str] = &["=", "<>", ">", ">=", "<", "IN", "LIKE", "BETWEEN", "IS NULL"];
const LEAF_KINDS: &[&str] = &[
    "Query",
    "ExecuteSql",
    "CalculatedColumn",
    "SetVariable",
    "DeclareVariable",
    "CreateTable",
    "PurgeTable",
    "CopyTable",
    "JoinTables",
    "FilterTable",
    "SortTable",
    "AggregateTable",
    "ImportFile",
    "ExportFile",
    "WarehouseImport",
    "SendEmail",
    "RunScript",
    "Wait",
    "LogMessage",
];
const CONTAINER_KINDS: &[&str] = &["Group", "Loop", "Decision"];

/// A CLI tool to generate random process definitions for the Kaidoku analyzer
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// The path to write the generated JSON file to
    #[arg(short, long, default_value = "generated_process.json")]
    output: String,

    /// The number of steps to generate
    #[arg(long, default_value_t = 40)]
    steps: usize,

    /// The maximum nesting depth of container steps
    #[arg(long, default_value_t = 4)]
    max_depth: usize,

    /// Seed for reproducible output
    #[arg(long)]
    seed: Option<u64>,

    /// Keep records in tree order instead of shuffling them
    #[arg(long)]
    ordered: bool,
}

struct Generator {
    rng: StdRng,
    steps: Vec<StepRecord>,
    variables: Vec<String>,
    max_depth: usize,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    if cli.steps == 0 {
        eprintln!("Error: --steps must be at least 1");
        std::process::exit(1);
    }

    let rng = match cli.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };
    let mut generator = Generator {
        rng,
        steps: Vec::with_capacity(cli.steps),
        variables: Vec::new(),
        max_depth: cli.max_depth,
    };

    println!(
        "Generating a process with {} steps (max depth {})...",
        cli.steps, cli.max_depth
    );
    let mut open: Vec<(String, usize)> = Vec::new();
    while generator.steps.len() < cli.steps {
        generator.next_step(&mut open);
    }

    let mut steps = generator.steps;
    if !cli.ordered {
        // The analyzer must not depend on parent-before-child order.
        let mut rng = generator.rng;
        steps.shuffle(&mut rng);
    }

    let container = json!({ "Steps": { "Step": steps } });
    fs::write(&cli.output, serde_json::to_string_pretty(&container)?)?;

    println!(
        "Successfully generated and saved process definition to '{}'",
        cli.output
    );
    Ok(())
}

impl Generator {
    /// Adds one step under a random open container (or at the root).
    fn next_step(&mut self, open: &mut Vec<(String, usize)>) {
        let id = (self.steps.len() + 1).to_string();
        let parent = if open.is_empty() || self.rng.random_bool(0.2) {
            None
        } else {
            open.choose(&mut self.rng).cloned()
        };
        let depth = parent.as_ref().map_or(0, |(_, d)| d + 1);

        let container = depth < self.max_depth && self.rng.random_bool(0.2);
        let kind = if container {
            pick(&mut self.rng, CONTAINER_KINDS)
        } else {
            pick(&mut self.rng, LEAF_KINDS)
        };

        let params = self.params_for(kind);
        let mut step = StepRecord::new(id.clone(), kind)
            .with_name(format!("{} {}", kind, id))
            .with_params(params);
        step = match &parent {
            Some((parent_id, _)) => step.with_parent(parent_id.clone()),
            None => step.with_parent("0"),
        };
        if self.rng.random_bool(0.9) {
            step = step.with_sequence(self.rng.random_range(1..=50));
        }
        if self.rng.random_bool(0.1) {
            step = step.inactive();
        }

        if container {
            open.push((id.clone(), depth));
            // Decisions hold branches, so give them one straight away.
            if kind == "Decision" {
                self.push_branch(&id);
            }
        }
        self.steps.push(step);
    }

    fn push_branch(&mut self, decision_id: &str) {
        let id = format!("{}b", decision_id);
        let criteria = self.criteria_set(1);
        self.steps.push(
            StepRecord::new(id, "Branch")
                .with_parent(decision_id)
                .with_sequence(1)
                .with_params(json!({ "CriteriaSet": criteria })),
        );
    }

    fn params_for(&mut self, kind: &str) -> Value {
        let source = pick(&mut self.rng, TABLES);
        let target = format!("{}_{}", pick(&mut self.rng, TABLES), self.rng.random_range(1..100));
        match kind {
            "Query" => json!({
                "Sql": format!("SELECT * FROM {} WHERE {} > {}", source, pick(&mut self.rng, COLUMNS), self.variable_or_literal()),
                "TargetTable": target,
            }),
            "ExecuteSql" => json!({
                "Sql": format!("UPDATE {} SET Flag = 1", source),
                "TableName": source,
            }),
            "CalculatedColumn" => {
                let expression = self.conditional(3);
                json!({
                    "TableName": source,
                    "Columns": [{ "Name": "Derived", "DataType": "varchar", "Expression": expression }],
                })
            }
            "SetVariable" | "DeclareVariable" => {
                let name = format!("@Var{}", self.variables.len() + 1);
                self.variables.push(name.clone());
                let value = if self.rng.random_bool(0.5) {
                    self.conditional(3)
                } else {
                    self.rng.random_range(0..1000).to_string()
                };
                json!({ "VariableName": name, "VariableValue": value })
            }
            "CreateTable" | "PurgeTable" => json!({
                "TableName": target,
                "Columns": [{ "Name": "Id", "DataType": "int" }, { "Name": "Value", "DataType": "decimal" }],
            }),
            "CopyTable" => json!({ "SourceTable": source, "TargetTable": target }),
            "JoinTables" => json!({
                "LeftTable": source,
                "RightTable": pick(&mut self.rng, TABLES),
                "TargetTable": target,
                "JoinType": pick(&mut self.rng, &["INNER", "LEFT", "FULL"]),
                "JoinColumns": { "LeftColumn": "Id", "RightColumn": "Id" },
            }),
            "FilterTable" => {
                let criteria = self.criteria_set(2);
                json!({ "SourceTable": source, "CriteriaSet": criteria })
            }
            "SortTable" => json!({
                "SourceTable": source,
                "SortColumns": [{ "Column": pick(&mut self.rng, COLUMNS), "Direction": "DESC" }],
            }),
            "AggregateTable" => json!({
                "SourceTable": source,
                "TargetTable": target,
                "GroupBy": ["Region"],
                "Aggregates": { "Function": "SUM", "Column": "Amount", "Alias": "Total" },
            }),
            "ImportFile" => json!({ "FilePath": format!("C:\\drop\\{}.csv", source.to_lowercase()), "HasHeader": true }),
            "ExportFile" => json!({ "SourceTable": source, "FilePath": format!("/out/{}.csv", target) }),
            "WarehouseImport" => json!({
                "SourceTable": source,
                "WarehouseName": "Sales",
                "TargetTable": target,
                "ImportMode": self.rng.random_range(0..5),
                "Mappings": [{ "SourceColumn": "st", "TargetColumn": "Status",
                               "Expression": "CASE st WHEN 'A' THEN 'Active' ELSE 'Other' END" }],
            }),
            "SendEmail" => json!({ "To": "ops@example.com", "Subject": format!("{} refreshed", source) }),
            "RunScript" => json!({ "Language": "Python", "Script": "print('done')" }),
            "Wait" => json!({ "Seconds": self.rng.random_range(1..60) }),
            "LogMessage" => json!({ "Message": format!("Finished {}", source) }),
            "Loop" => {
                let name = format!("@i{}", self.variables.len() + 1);
                self.variables.push(name.clone());
                json!({ "IteratorVariable": name, "StartValue": 1, "EndValue": self.rng.random_range(2..13) })
            }
            "Decision" => json!({ "Expression": format!("{} > 0", self.variable_or_literal()) }),
            _ => Value::Null,
        }
    }

    /// A random `IIF` chain or `CASE` block with up to `max_rules` conditions.
    fn conditional(&mut self, max_rules: usize) -> String {
        let rules = self.rng.random_range(1..=max_rules);
        if self.rng.random_bool(0.5) {
            let mut expression = "'Other'".to_string();
            for n in (0..rules).rev() {
                expression = format!(
                    "IIF({} > {}, 'Band{}', {})",
                    pick(&mut self.rng, COLUMNS),
                    n * 10,
                    n,
                    expression
                );
            }
            expression
        } else {
            let whens: String = (0..rules)
                .map(|n| format!(" WHEN {} = {} THEN 'Band{}'", pick(&mut self.rng, COLUMNS), n, n))
                .collect();
            format!("CASE{} ELSE 'Other' END", whens)
        }
    }

    fn criteria_set(&mut self, depth: usize) -> Value {
        let count = self.rng.random_range(1..=3);
        let criteria: Vec<Value> = (0..count)
            .map(|_| {
                let op = pick(&mut self.rng, OPERATORS);
                json!({
                    "Column": pick(&mut self.rng, COLUMNS),
                    "Operator": op,
                    "Value1": self.rng.random_range(0..100),
                    "Value2": self.rng.random_range(100..200),
                })
            })
            .collect();
        if depth > 1 && self.rng.random_bool(0.5) {
            let nested = self.criteria_set(depth - 1);
            json!({ "Connective": "AND", "Criteria": criteria, "SubGroup": nested })
        } else {
            json!({ "Connective": "OR", "Criteria": criteria })
        }
    }

    fn variable_or_literal(&mut self) -> String {
        match self.variables.choose(&mut self.rng) {
            Some(name) if self.rng.random_bool(0.7) => name.clone(),
            _ => self.rng.random_range(0..100).to_string(),
        }
    }
}

fn pick<'a>(rng: &mut StdRng, items: &[&'a str]) -> &'a str {
    items.choose(rng).copied().unwrap_or_default()
}
