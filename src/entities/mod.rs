pub mod genero;
pub mod horario;
pub mod pelicula;
pub mod sala;
pub mod venta;
