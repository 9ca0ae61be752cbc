pub mod register_handler;
