pub mod flash_distance;
mod raw_flash;
