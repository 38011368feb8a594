// File adapters for the application ports

pub mod output_adapter;
pub mod table_source;

pub use output_adapter::FileOutputAdapter;
pub use table_source::JsonTableSource;
