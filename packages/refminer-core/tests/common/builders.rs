//! Test data builders
//!
//! Shorthand for single-type models so scenarios read as before/after bodies.

use refminer_core::shared::models::builders::{OperationBuilder, TypeBuilder};
use refminer_core::shared::models::{Model, Operation, Statement};

/// Model with one type holding the given operations
pub fn model_of(type_name: &str, operations: Vec<Operation>) -> Model {
    let mut builder = TypeBuilder::new(type_name).file(&format!("src/{}.java", type_name.replace('.', "/")));
    for op in operations {
        builder = builder.operation(op);
    }
    Model::new(vec![builder.build()])
}

/// Parameterless operation with the given body
pub fn op(name: &str, body: Vec<Statement>) -> Operation {
    OperationBuilder::new(name).body(body).build()
}

/// Operation with one parameter per `(type, name)` pair
pub fn op_with_params(name: &str, params: &[(&str, &str)], body: Vec<Statement>) -> Operation {
    let mut builder = OperationBuilder::new(name);
    for (type_name, param) in params {
        builder = builder.param(type_name, param);
    }
    builder.body(body).build()
}
