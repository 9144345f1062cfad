//! Model building and constraint logic for the section selection ILP.

mod model_conflicts;
mod model_context;
mod model_courses;
mod model_limits;

pub use model_context::{LinearConstraint, Model, ModelBuilderContext, build, build_model_pipeline, build_with_strategy};
