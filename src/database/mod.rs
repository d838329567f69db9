pub mod current_user_repo;
