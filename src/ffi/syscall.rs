use std::fs::File;
use std::io::{Error, Result};
use std::mem::MaybeUninit;
use std::os::fd::{AsRawFd, FromRawFd, RawFd};

use super::Attr;

pub fn perf_event_open(attr: &Attr, pid: i32, cpu: i32, group_fd: i32, flags: u64) -> Result<File> {
    let num = libc::SYS_perf_event_open;
    let fd = unsafe { libc::syscall(num, attr, pid, cpu, group_fd, flags) };
    if fd != -1 {
        Ok(unsafe { File::from_raw_fd(fd as _) })
    } else {
        Err(Error::last_os_error())
    }
}

pub fn ioctl_arg(fd: RawFd, op: u64, arg: u64) -> Result<i32> {
    let result = unsafe { libc::ioctl(fd, op as _, arg) };
    if result != -1 {
        Ok(result)
    } else {
        Err(Error::last_os_error())
    }
}

pub fn fcntl_arg(file: &File, op: i32, arg: i32) -> Result<i32> {
    let fd = file.as_raw_fd();
    let result = unsafe { libc::fcntl(fd, op, arg) };
    if result != -1 {
        Ok(result)
    } else {
        Err(Error::last_os_error())
    }
}

pub fn fcntl_argp<T>(file: &File, op: i32, argp: &T) -> Result<i32> {
    let fd = file.as_raw_fd();
    let result = unsafe { libc::fcntl(fd, op, argp as *const T) };
    if result != -1 {
        Ok(result)
    } else {
        Err(Error::last_os_error())
    }
}

pub fn gettid() -> libc::pid_t {
    unsafe { libc::syscall(libc::SYS_gettid) as _ }
}

pub fn sigaction(
    signo: i32,
    act: Option<&libc::sigaction>,
    old: &mut MaybeUninit<libc::sigaction>,
) -> Result<()> {
    let act = act.map_or(std::ptr::null(), |it| it as _);
    let result = unsafe { libc::sigaction(signo, act, old.as_mut_ptr()) };
    if result != -1 {
        Ok(())
    } else {
        Err(Error::last_os_error())
    }
}

pub fn eventfd(init: u32, flags: i32) -> Result<File> {
    let fd = unsafe { libc::eventfd(init, flags) };
    if fd != -1 {
        Ok(unsafe { File::from_raw_fd(fd) })
    } else {
        Err(Error::last_os_error())
    }
}

pub fn read_fd(fd: RawFd, buf: &mut [u8]) -> Result<usize> {
    let bytes = unsafe { libc::read(fd, buf.as_mut_ptr() as _, buf.len()) };
    if bytes != -1 {
        Ok(bytes as _)
    } else {
        Err(Error::last_os_error())
    }
}

pub fn write_fd(fd: RawFd, buf: &[u8]) -> Result<usize> {
    let bytes = unsafe { libc::write(fd, buf.as_ptr() as _, buf.len()) };
    if bytes != -1 {
        Ok(bytes as _)
    } else {
        Err(Error::last_os_error())
    }
}

pub fn close_fd(fd: RawFd) -> Result<()> {
    let result = unsafe { libc::close(fd) };
    if result != -1 {
        Ok(())
    } else {
        Err(Error::last_os_error())
    }
}
