pub mod job_post;
