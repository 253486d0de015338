use serde::{Deserialize, Serialize};
use std::fmt;

/// Lowercases a vendor type tag and drops separators so that `Set Variable`,
/// `set_variable` and `SetVariable` all compare equal.
pub(crate) fn normalize_tag(tag: &str) -> String {
    tag.chars()
        .filter(|c| !matches!(c, ' ' | '_' | '-' | '.'))
        .flat_map(char::to_lowercase)
        .collect()
}

/// Master macro defining every recognized step kind, its display label, and
/// the extra tag spellings it is recognized under.
macro_rules! define_step_kinds {
    ( $( $variant:ident => $label:expr, [ $( $alias:expr ),* ] ),* $(,)? ) => {
        /// The resolved operation type of a step. Unrecognized tags are kept verbatim in `Other`.
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum StepKind {
            $( $variant, )*
            Other(String),
        }

        impl StepKind {
            /// Resolves a vendor type tag. Never fails; unknown tags become `Other`.
            pub fn from_tag(tag: &str) -> Self {
                let key = normalize_tag(tag);
                $(
                    if key == normalize_tag(stringify!($variant)) $( || key == $alias )* {
                        return StepKind::$variant;
                    }
                )*
                StepKind::Other(tag.trim().to_string())
            }

            /// Human-readable name of the kind.
            pub fn label(&self) -> &str {
                match self {
                    $( StepKind::$variant => $label, )*
                    StepKind::Other(tag) => tag,
                }
            }
        }
    };
}

define_step_kinds! {
    Query => "Query", ["select", "sqlquery", "runquery"],
    ExecuteSql => "Execute SQL", ["sql", "executestatement", "runsql"],
    CalculatedColumn => "Calculated Column", ["addcalculatedcolumn", "calculatedfield", "derivedcolumn"],
    SetVariable => "Set Variable", ["assignvariable", "setvar"],
    DeclareVariable => "Declare Variable", ["declarevar", "variable"],
    SetVariableFromQuery => "Set Variable From Query", ["queryvariable", "setvariablefromsql"],
    Loop => "Loop", ["foreach", "forloop", "whileloop", "iterate"],
    Group => "Group", ["stepgroup", "container", "sequence"],
    Decision => "Decision", ["if", "condition", "ifthen"],
    Branch => "Branch", ["else", "elseif", "case", "path"],
    CreateTable => "Create Table", ["newtable"],
    DeleteTable => "Delete Table", ["droptable", "removetable"],
    PurgeTable => "Purge Table", ["truncatetable", "cleartable", "emptytable"],
    CopyTable => "Copy Table", ["duplicatetable", "clonetable"],
    AppendTable => "Append Table", ["appendrows", "union", "inserttable"],
    JoinTables => "Join Tables", ["join", "mergetables"],
    FilterTable => "Filter Table", ["filter", "filterrows", "where"],
    SortTable => "Sort Table", ["sort", "orderby"],
    AggregateTable => "Aggregate Table", ["aggregate", "groupby", "summarize"],
    DeduplicateTable => "Deduplicate Table", ["dedupe", "removeduplicates", "distinct"],
    RenameColumns => "Rename Columns", ["renamecolumn", "rename"],
    ImportFile => "Import File", ["loadfile", "readfile", "fileimport", "importcsv"],
    ExportFile => "Export File", ["writefile", "fileexport", "exportcsv"],
    WarehouseImport => "Warehouse Import", ["importtowarehouse", "dwimport", "loadwarehouse"],
    SendEmail => "Send Email", ["email", "sendmail", "notify"],
    RunScript => "Run Script", ["script", "executescript"],
    RunProcess => "Run Process", ["callprocess", "subprocess", "runjob"],
    Wait => "Wait", ["pause", "sleep", "delay"],
    LogMessage => "Log Message", ["log", "writelog", "message"],
    TransferFile => "Transfer File", ["ftp", "sftp", "upload", "download", "movefile", "copyfile"],
    DeleteFile => "Delete File", ["removefile"],
    Stop => "Stop", ["exit", "abort", "endprocess"],
}

impl StepKind {
    /// Control-flow kinds that shape the tree and are never filtered out.
    pub fn is_structural(&self) -> bool {
        matches!(
            self,
            StepKind::Loop | StepKind::Group | StepKind::Decision | StepKind::Branch
        )
    }

    /// Decision and branch steps are reported active whatever their stored flag says.
    pub fn is_forced_active(&self) -> bool {
        matches!(self, StepKind::Decision | StepKind::Branch)
    }

    /// Housekeeping kinds left out of business-mode narration.
    pub fn is_housekeeping(&self) -> bool {
        matches!(
            self,
            StepKind::CreateTable
                | StepKind::DeleteTable
                | StepKind::PurgeTable
                | StepKind::DeleteFile
                | StepKind::Wait
                | StepKind::LogMessage
        )
    }

    pub fn defines_variable(&self) -> bool {
        matches!(
            self,
            StepKind::SetVariable | StepKind::DeclareVariable | StepKind::SetVariableFromQuery
        )
    }
}

impl fmt::Display for StepKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
