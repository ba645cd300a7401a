mod tar_archive;

pub use tar_archive::TarGzArchiver;
