pub mod request_contents_route;
pub mod static_files_route;

pub mod help {
    pub mod help_route;
}

pub mod feedback {
    pub mod detailed_feedback_route;
    pub mod feedback_route;
}
