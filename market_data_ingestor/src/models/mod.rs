pub mod bar;
pub mod company;
pub mod indicator;
