pub mod airport;
pub mod city;
pub mod country;
