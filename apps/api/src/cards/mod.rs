// Card endpoints: pagination, preview markup and PNG export.

pub mod handlers;
