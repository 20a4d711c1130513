//! Request handlers, one module per resource.

mod applications;
mod health;
mod tasks;

pub use applications::{
    decide_application, get_application, list_my_applications, withdraw_application,
};
pub use health::health_check;
pub use tasks::{
    create_task, delete_task, deliver, get_task, list_task_applications, list_tasks,
    make_payment, mark_received, request_extension, respond_extension, submit_application,
    update_task,
};
