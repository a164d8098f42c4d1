pub mod deadline;
pub mod task_parser;
pub mod task_serializer;

pub use deadline::{DateError, format_deadline, parse_deadline};
pub use task_parser::{DroppedLine, LineError, LineFault, ParsedTasks, parse_task_file, parse_task_line};
pub use task_serializer::{serialize_task, serialize_tasks};
