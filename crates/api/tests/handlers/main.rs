#[path = "../test_utils.rs"]
mod test_utils;

mod admin_test;
mod availability_test;
mod middleware_test;
mod pacientes_test;
mod turnos_test;
