mod libsql;

pub use libsql::LibSqlBackend;
